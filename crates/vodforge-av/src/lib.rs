//! # vodforge-av
//!
//! The parts of vodforge that touch ffprobe, ffmpeg and the filesystem.
//!
//! This crate provides:
//! - Source inspection: probe an upload and extract its video dimensions
//! - Encoding sessions: one ffmpeg invocation producing every HLS rendition
//! - Job workspaces: per-job output directories and their cleanup
//! - Tool discovery for `vodforge check-tools`
//!
//! ## Example
//!
//! ```no_run
//! use vodforge_av::{encode, inspect, EncodingEngine, FfmpegEngine, FfprobeProber};
//! use vodforge_media::{ladder, Catalog};
//! use std::path::Path;
//!
//! # async fn example() -> vodforge_av::Result<()> {
//! let source = Path::new("public/job/video-job.mp4");
//! let profile = inspect(&FfprobeProber::default(), source).await?;
//! let ladder = ladder::select(&Catalog::default(), &profile);
//!
//! let session = encode::build(source, Path::new("public/job"), &ladder, &Default::default());
//! let outcome = FfmpegEngine::default().run(&session).await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod command;
pub mod encode;
mod error;
pub mod probe;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use encode::{EncodeOutcome, EncodeSettings, EncodingEngine, FfmpegEngine, SessionSpec};
pub use error::{Error, Result};
pub use probe::{inspect, FfprobeProber, ProbeReport, Prober};
pub use tools::{check_tool, check_tools, ToolInfo, ToolPaths};
pub use workspace::{cleanup, CleanupError, CleanupGuard, JobWorkspace};
