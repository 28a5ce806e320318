//! Probe result types.

use serde::{Deserialize, Serialize};

/// Kind of elementary stream, as ffprobe reports it in `codec_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecType {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    #[serde(other)]
    Unknown,
}

/// One stream of a probed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbedStream {
    /// Stream index within the container.
    pub index: u32,
    /// Stream kind.
    pub codec_type: CodecType,
    /// Codec name (e.g., "h264", "aac").
    pub codec_name: Option<String>,
    /// Width in pixels, video streams only.
    pub width: Option<u32>,
    /// Height in pixels, video streams only.
    pub height: Option<u32>,
}

impl ProbedStream {
    pub fn is_video(&self) -> bool {
        self.codec_type == CodecType::Video
    }
}

/// Stream listing of a probed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Container format name, when the prober knows it.
    pub container: Option<String>,
    /// Duration in seconds, when known.
    pub duration_secs: Option<f64>,
    /// Streams in container order.
    pub streams: Vec<ProbedStream>,
}

impl ProbeReport {
    /// The first video stream, which is the one renditions are scaled from.
    pub fn primary_video(&self) -> Option<&ProbedStream> {
        self.streams.iter().find(|s| s.is_video())
    }
}
