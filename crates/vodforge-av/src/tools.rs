//! External tool detection.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// ffmpeg and ffprobe take `-version` rather than `--version`.
///
/// ```no_run
/// use vodforge_av::check_tool;
///
/// let info = check_tool("ffprobe", None);
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, configured: Option<&Path>) -> ToolInfo {
    let program = configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(name));

    match Command::new(&program).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(&program).ok(),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check the tools the transcoding pipeline shells out to.
pub fn check_tools(paths: &ToolPaths) -> Vec<ToolInfo> {
    vec![
        check_tool("ffmpeg", Some(&paths.ffmpeg)),
        check_tool("ffprobe", Some(&paths.ffprobe)),
    ]
}

/// Resolved locations of ffmpeg and ffprobe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Use configured paths as given, falling back to bare names that the
    /// OS resolves through PATH at spawn time. Never fails; a missing tool
    /// surfaces as [`crate::Error::ToolNotFound`] when first run.
    pub fn lenient(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Self {
        Self {
            ffmpeg: ffmpeg.map_or_else(|| PathBuf::from("ffmpeg"), Path::to_path_buf),
            ffprobe: ffprobe.map_or_else(|| PathBuf::from("ffprobe"), Path::to_path_buf),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::lenient(None, None)
    }
}
