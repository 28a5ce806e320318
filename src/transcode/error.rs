//! Failure taxonomy of the transcoding pipeline.

use thiserror::Error;

/// Why a job did not publish.
///
/// `Validation` and `EmptyLadder` are the caller's problem and are reported
/// as rejections; everything else is a server fault.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The request itself is unusable: no file, empty title.
    #[error("{0}")]
    Validation(String),

    /// The source could not be probed.
    #[error("failed to probe source: {0}")]
    Probe(String),

    /// The source has no video stream.
    #[error("source has no video stream")]
    NoVideoStream,

    /// The source is smaller than every configured rendition.
    #[error("Uploaded video quality is too low for processing ({width}x{height})")]
    EmptyLadder { width: u32, height: u32 },

    /// The encoder failed, or did not produce every rendition.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// The video could not be registered.
    #[error("failed to register video: {0}")]
    Persistence(String),
}

impl TranscodeError {
    /// Client-facing rejection rather than a server fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::EmptyLadder { .. })
    }

    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Probe(_) => "probe_failed",
            Self::NoVideoStream => "no_video_stream",
            Self::EmptyLadder { .. } => "quality_too_low",
            Self::Encode(_) => "encode_failed",
            Self::Persistence(_) => "persistence_failed",
        }
    }
}

impl From<vodforge_av::Error> for TranscodeError {
    /// Errors from source inspection.
    fn from(err: vodforge_av::Error) -> Self {
        match err {
            vodforge_av::Error::NoVideoStream { .. } => Self::NoVideoStream,
            other => Self::Probe(other.to_string()),
        }
    }
}
