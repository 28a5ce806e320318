//! Error types for vodforge-media.

use thiserror::Error;

/// Result type for vodforge-media operations.
pub type Result<T> = std::result::Result<T, PresetError>;

/// A malformed preset or catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresetError {
    /// Bitrate string could not be parsed.
    #[error("invalid bitrate {0:?}: expected bits/sec with an optional k or M suffix")]
    InvalidBitrate(String),

    /// The catalog has no presets at all.
    #[error("preset catalog is empty")]
    EmptyCatalog,

    /// Two presets share a name.
    #[error("duplicate preset name: {0}")]
    DuplicateName(String),

    /// A preset name cannot be used as a file name.
    #[error("invalid preset name {0:?}: use letters, digits, '-' or '_' (and not \"index\")")]
    InvalidName(String),

    /// A preset has a zero width, height or bitrate.
    #[error("preset {0} must have a non-zero width, height and bitrate")]
    ZeroValue(String),

    /// The catalog is not ordered from highest to lowest resolution.
    #[error("preset {next} is larger than {previous}; the catalog must be ordered by descending resolution")]
    OutOfOrder { previous: String, next: String },
}
