//! Builder for running external tool processes.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// The last `lines` lines of stderr, which is where ffmpeg puts the
    /// reason for a failure.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.stderr.trim_end().lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// A builder for constructing and running external tool invocations.
///
/// Without a timeout the process runs until it exits. Encoding sessions use
/// this mode: once started they run to completion or failure.
///
/// # Example
///
/// ```no_run
/// use vodforge_av::ToolCommand;
/// use std::time::Duration;
///
/// # async fn example() -> vodforge_av::Result<()> {
/// let output = ToolCommand::new("ffprobe")
///     .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
///     .arg("/path/to/upload.mp4")
///     .timeout(Duration::from_secs(30))
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append a path argument.
    pub fn path_arg(&mut self, path: &Path) -> &mut Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = Some(d);
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Run the command and capture its output, whatever the exit status.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the program does not exist.
    /// - [`Error::ToolFailed`] if spawning fails, waiting fails or the
    ///   timeout expires.
    pub async fn output(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();
        tracing::debug!(tool = %program_name, args = ?self.args, "running tool");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(&program_name)
            } else {
                Error::tool_failed(&program_name, format!("failed to spawn: {e}"))
            }
        })?;

        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    Error::tool_failed(&program_name, format!("timed out after {limit:?}"))
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| {
            Error::tool_failed(&program_name, format!("I/O error waiting for process: {e}"))
        })?;

        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run the command and require a zero exit status.
    ///
    /// # Errors
    ///
    /// Everything [`output`](Self::output) returns, plus
    /// [`Error::ToolFailed`] carrying stderr on a non-zero exit.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let output = self.output().await?;
        if !output.status.success() {
            return Err(Error::tool_failed(
                self.program_name(),
                format!(
                    "exited with status {}: {}",
                    output.status,
                    output.stderr.trim()
                ),
            ));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        let output = ToolCommand::new("echo").arg("hello").execute().await;

        // Minimal environments may lack echo.
        if let Ok(out) = output {
            assert!(out.status.success());
            assert!(out.stdout.trim().contains("hello"));
        }
    }

    #[tokio::test]
    async fn execute_nonexistent_tool() {
        let result = ToolCommand::new("nonexistent_tool_xyz_12345").execute().await;
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn timeout_fires() {
        let result = ToolCommand::new("sleep")
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await;
        if let Err(Error::ToolNotFound { .. }) = result {
            return;
        }
        let err = result.unwrap_err().to_string();
        assert!(err.contains("timed out"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn nonzero_exit_is_captured_by_output() {
        let Ok(out) = ToolCommand::new("false").output().await else {
            return;
        };
        assert!(!out.status.success());

        let err = ToolCommand::new("false").execute().await.unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn stderr_tail_keeps_last_lines() {
        use std::os::unix::process::ExitStatusExt;

        let out = ToolOutput {
            status: ExitStatus::from_raw(0),
            stdout: String::new(),
            stderr: "one\ntwo\nthree\nfour\n".to_string(),
        };
        assert_eq!(out.stderr_tail(2), "three\nfour");
        assert_eq!(out.stderr_tail(10), "one\ntwo\nthree\nfour");
    }
}
