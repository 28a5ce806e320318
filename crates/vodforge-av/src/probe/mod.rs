//! Source inspection.
//!
//! A [`Prober`] lists the streams of a file; [`inspect`] reduces that listing
//! to the [`SourceProfile`] ladder selection needs.

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_json, FfprobeProber};
pub use types::*;

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use vodforge_media::SourceProfile;

/// A media file prober.
///
/// Implementations must be safe to share across jobs (`Send + Sync`).
#[async_trait]
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// List the streams of the file at `path`.
    async fn probe(&self, path: &Path) -> Result<ProbeReport>;
}

/// Probe `path` and return the dimensions of its first video stream.
///
/// # Errors
///
/// - [`Error::NoVideoStream`] if the file has no video stream.
/// - [`Error::ParseError`] if the video stream has no usable dimensions.
/// - Whatever the prober returns if the probe itself fails.
pub async fn inspect(prober: &dyn Prober, path: &Path) -> Result<SourceProfile> {
    let report = prober.probe(path).await?;

    let video = report.primary_video().ok_or_else(|| Error::NoVideoStream {
        path: path.to_path_buf(),
    })?;

    match (video.width, video.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            tracing::debug!(
                prober = prober.name(),
                path = %path.display(),
                width,
                height,
                "inspected source"
            );
            Ok(SourceProfile::new(width, height))
        }
        _ => Err(Error::parse_error(
            prober.name(),
            format!("video stream {} has no dimensions", video.index),
        )),
    }
}
