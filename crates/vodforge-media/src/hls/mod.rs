//! HLS playlist generation.
//!
//! Only the master playlist is produced here. The per-rendition segment
//! playlists are written by the encoder itself.

mod playlist;

pub use playlist::{synthesize, MasterPlaylist, StreamInfo};

/// Extension of every playlist the pipeline writes or references.
pub const MANIFEST_EXTENSION: &str = "m3u8";

/// File stem of the master playlist inside a job directory.
pub const MASTER_MANIFEST_STEM: &str = "index";

/// File name of the master playlist inside a job directory.
pub fn master_manifest_name() -> String {
    format!("{MASTER_MANIFEST_STEM}.{MANIFEST_EXTENSION}")
}
