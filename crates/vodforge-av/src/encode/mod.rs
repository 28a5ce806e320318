//! Encoding sessions.
//!
//! [`build`] turns a ladder into one [`SessionSpec`]: a single decode of the
//! source feeding one HLS output per rung. An [`EncodingEngine`] runs the
//! session and reports a single [`EncodeOutcome`].

mod ffmpeg;

pub use ffmpeg::FfmpegEngine;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vodforge_media::hls::MANIFEST_EXTENSION;
use vodforge_media::{Bitrate, Ladder, Preset};

/// Target segment length in seconds.
pub const SEGMENT_DURATION_SECS: u32 = 10;

/// GOP length in frames. Pinned with `-keyint_min` and `-sc_threshold 0`
/// so every segment boundary lands on a keyframe.
pub const KEYFRAME_INTERVAL: u32 = 48;

/// Extension of the MPEG-TS media segments.
pub const SEGMENT_EXTENSION: &str = "ts";

/// Encoder settings shared by every rendition of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub threads: u32,
    pub video_codec: String,
    pub video_profile: String,
    pub audio_codec: String,
    pub audio_sample_rate: u32,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            threads: 4,
            video_codec: "libx264".to_string(),
            video_profile: "main".to_string(),
            audio_codec: "aac".to_string(),
            audio_sample_rate: 48_000,
        }
    }
}

/// One output of a session: a rendition's segment manifest and segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub name: String,
    pub scale_filter: String,
    pub quality_factor: u8,
    pub bitrate: Bitrate,
    /// `<output_dir>/<name>.m3u8`
    pub manifest_path: PathBuf,
    /// `<output_dir>/<name>_%03d.ts`
    pub segment_pattern: PathBuf,
}

impl OutputSpec {
    fn for_preset(output_dir: &Path, preset: &Preset) -> Self {
        Self {
            name: preset.name.clone(),
            scale_filter: preset.scale_expression(),
            quality_factor: preset.quality_factor,
            bitrate: preset.bitrate,
            manifest_path: output_dir.join(format!("{}.{MANIFEST_EXTENSION}", preset.name)),
            segment_pattern: output_dir
                .join(format!("{}_%03d.{SEGMENT_EXTENSION}", preset.name)),
        }
    }

    /// ffmpeg options for this output, ending with the output path.
    pub fn args(&self, settings: &EncodeSettings) -> Vec<String> {
        vec![
            "-threads".into(),
            settings.threads.to_string(),
            "-vf".into(),
            self.scale_filter.clone(),
            "-c:a".into(),
            settings.audio_codec.clone(),
            "-ar".into(),
            settings.audio_sample_rate.to_string(),
            "-c:v".into(),
            settings.video_codec.clone(),
            "-profile:v".into(),
            settings.video_profile.clone(),
            "-crf".into(),
            self.quality_factor.to_string(),
            "-sc_threshold".into(),
            "0".into(),
            "-g".into(),
            KEYFRAME_INTERVAL.to_string(),
            "-keyint_min".into(),
            KEYFRAME_INTERVAL.to_string(),
            "-b:v".into(),
            self.bitrate.to_string(),
            "-f".into(),
            "hls".into(),
            "-hls_time".into(),
            SEGMENT_DURATION_SECS.to_string(),
            "-hls_playlist_type".into(),
            "vod".into(),
            "-hls_segment_filename".into(),
            self.segment_pattern.to_string_lossy().into_owned(),
            self.manifest_path.to_string_lossy().into_owned(),
        ]
    }
}

/// One encoder invocation producing every rendition of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSpec {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub settings: EncodeSettings,
    pub outputs: Vec<OutputSpec>,
}

impl SessionSpec {
    /// Full ffmpeg argument vector: one input, then each output's options.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            self.source.to_string_lossy().into_owned(),
        ];
        for output in &self.outputs {
            args.extend(output.args(&self.settings));
        }
        args
    }

    /// Outputs whose segment manifest is not on disk.
    pub fn missing_outputs(&self) -> Vec<&OutputSpec> {
        self.outputs
            .iter()
            .filter(|o| !o.manifest_path.is_file())
            .collect()
    }

    /// Classify a finished session by what it left on disk.
    pub fn outcome_from_disk(&self) -> EncodeOutcome {
        let missing = self.missing_outputs();
        if missing.is_empty() {
            return EncodeOutcome::Completed;
        }

        let failed: Vec<String> = missing.iter().map(|o| o.name.clone()).collect();
        let completed = self
            .outputs
            .iter()
            .filter(|o| !failed.contains(&o.name))
            .map(|o| o.name.clone())
            .collect();

        EncodeOutcome::Partial { completed, failed }
    }
}

/// Build the session for `ladder`. Does not touch the filesystem.
pub fn build(
    source: &Path,
    output_dir: &Path,
    ladder: &Ladder,
    settings: &EncodeSettings,
) -> SessionSpec {
    SessionSpec {
        source: source.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        settings: settings.clone(),
        outputs: ladder
            .iter()
            .map(|preset| OutputSpec::for_preset(output_dir, preset))
            .collect(),
    }
}

/// Terminal result of running a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// Every scheduled output was produced.
    Completed,
    /// The engine failed outright.
    Failed { message: String },
    /// The engine finished but only some outputs exist.
    Partial {
        completed: Vec<String>,
        failed: Vec<String>,
    },
}

/// Something that can run a [`SessionSpec`] to completion.
///
/// There is no cancellation: `run` returns once the session has finished or
/// failed.
#[async_trait]
pub trait EncodingEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, session: &SessionSpec) -> EncodeOutcome;
}
