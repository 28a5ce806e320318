//! ffmpeg-backed encoding engine.

use super::{EncodeOutcome, EncodingEngine, SessionSpec};
use crate::ToolCommand;
use async_trait::async_trait;
use std::path::PathBuf;

/// Lines of stderr kept in a failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Runs a [`SessionSpec`] as one ffmpeg process.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    program: PathBuf,
}

impl FfmpegEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl EncodingEngine for FfmpegEngine {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn run(&self, session: &SessionSpec) -> EncodeOutcome {
        let mut cmd = ToolCommand::new(&self.program);
        cmd.args(session.args());

        tracing::info!(
            source = %session.source.display(),
            outputs = session.outputs.len(),
            "starting ffmpeg session"
        );

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                return EncodeOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        if !output.status.success() {
            return EncodeOutcome::Failed {
                message: format!(
                    "ffmpeg exited with {}: {}",
                    output.status,
                    output.stderr_tail(STDERR_TAIL_LINES)
                ),
            };
        }

        session.outcome_from_disk()
    }
}
