//! Vodforge-Media: rendition presets, ladder selection and HLS playlists
//!
//! Everything in this crate is pure: no filesystem access, no processes, no
//! clocks. The orchestration layer feeds it a catalog and a probed source
//! and gets back values it can hand to the encoder and write to disk.
//!
//! # Modules
//!
//! - `presets` - The rendition catalog and the [`Bitrate`] type it is keyed on
//! - `ladder` - Choosing which presets a given source can fill
//! - `hls` - Master playlist (m3u8) synthesis
//!
//! # Example
//!
//! ```
//! use vodforge_media::{hls, ladder, Catalog, SourceProfile};
//!
//! let catalog = Catalog::default();
//! let ladder = ladder::select(&catalog, &SourceProfile::new(1920, 1080));
//! assert_eq!(ladder.names(), ["1080p", "720p", "480p", "360p", "144p"]);
//!
//! let master = hls::synthesize(&ladder);
//! assert!(master.starts_with("#EXTM3U\n"));
//! ```

pub mod error;
pub mod hls;
pub mod ladder;
pub mod presets;

pub use error::{PresetError, Result};
pub use hls::{MasterPlaylist, StreamInfo};
pub use ladder::{Ladder, SourceProfile};
pub use presets::{Bitrate, Catalog, Preset};
