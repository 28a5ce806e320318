//! FFprobe-based source probing.

use super::types::*;
use super::Prober;
use crate::{Error, Result, ToolCommand};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// ffprobe only reads headers; anything slower than this is a broken file.
const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// [`Prober`] backed by the ffprobe CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<ProbeReport> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let output = ToolCommand::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .path_arg(path)
            .timeout(PROBE_TIMEOUT)
            .execute()
            .await?;

        parse_ffprobe_json(&output.stdout)
    }
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
pub fn parse_ffprobe_json(json: &str) -> Result<ProbeReport> {
    if json.trim().is_empty() {
        return Err(Error::parse_error("ffprobe", "empty output"));
    }
    let raw: FfprobeOutput = serde_json::from_str(json)?;

    let (container, duration_secs) = match raw.format {
        Some(format) => (
            format.format_name,
            format.duration.and_then(|s| s.parse::<f64>().ok()),
        ),
        None => (None, None),
    };

    let streams = raw
        .streams
        .into_iter()
        .map(|s| ProbedStream {
            index: s.index,
            codec_type: s
                .codec_type
                .as_deref()
                .map(parse_codec_type)
                .unwrap_or(CodecType::Unknown),
            codec_name: s.codec_name,
            width: s.width,
            height: s.height,
        })
        .collect();

    Ok(ProbeReport {
        container,
        duration_secs,
        streams,
    })
}

fn parse_codec_type(s: &str) -> CodecType {
    match s {
        "video" => CodecType::Video,
        "audio" => CodecType::Audio,
        "subtitle" => CodecType::Subtitle,
        "data" => CodecType::Data,
        "attachment" => CodecType::Attachment,
        _ => CodecType::Unknown,
    }
}
