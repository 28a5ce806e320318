//! HLS master playlist structures.

use crate::ladder::Ladder;
use crate::presets::Preset;

/// HLS protocol version declared by the master playlist.
const HLS_VERSION: u32 = 3;

/// Master playlist with one variant per rendition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterPlaylist {
    /// Stream variants, in the order they are listed.
    pub streams: Vec<StreamInfo>,
}

impl MasterPlaylist {
    /// Create an empty master playlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the master playlist for a ladder, one variant per preset in
    /// ladder order. URIs are relative to the master playlist.
    pub fn from_ladder(ladder: &Ladder) -> Self {
        ladder
            .iter()
            .fold(Self::new(), |master, preset| master.add_stream(StreamInfo::from(preset)))
    }

    /// Add a stream variant.
    pub fn add_stream(mut self, stream: StreamInfo) -> Self {
        self.streams.push(stream);
        self
    }

    /// Render to M3U8 text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("#EXTM3U\n");
        out.push_str(&format!("#EXT-X-VERSION:{HLS_VERSION}\n"));

        for stream in &self.streams {
            out.push_str(&format!(
                "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}x{}\n",
                stream.bandwidth, stream.width, stream.height
            ));
            out.push_str(&stream.uri);
            out.push('\n');
        }

        out
    }
}

/// Stream variant information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Playlist URI, relative to the master playlist.
    pub uri: String,
    /// Bandwidth in bits per second.
    pub bandwidth: u64,
    /// Video width.
    pub width: u32,
    /// Video height.
    pub height: u32,
}

impl From<&Preset> for StreamInfo {
    fn from(preset: &Preset) -> Self {
        Self {
            uri: preset.manifest_name(),
            bandwidth: preset.bandwidth(),
            width: preset.width,
            height: preset.height,
        }
    }
}

/// Render the master playlist text for `ladder`.
///
/// Pure: it neither reads nor writes files. The caller decides when the
/// renditions are complete enough to publish it.
pub fn synthesize(ladder: &Ladder) -> String {
    MasterPlaylist::from_ladder(ladder).render()
}
