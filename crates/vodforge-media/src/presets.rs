//! Rendition presets and the catalog they live in.
//!
//! A [`Preset`] describes one rung of the adaptive bitrate ladder. The
//! [`Catalog`] is the ordered list of every rung a deployment offers, highest
//! resolution first. The catalog is configuration, not code: the default
//! below is only what you get when the config file does not list presets.
//!
//! A preset's [`Bitrate`] is the single source of truth for both the
//! encoder's target rate and the `BANDWIDTH` attribute written to the master
//! playlist, so the two can never drift apart.

use crate::error::{PresetError, Result};
use crate::hls::{MANIFEST_EXTENSION, MASTER_MANIFEST_STEM};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A target bitrate in bits per second.
///
/// Parses the notation encoders use (`"5000k"`, `"7.5M"`, `"300000"`) and
/// renders back to the shortest exact form, which is also what gets passed
/// to `-b:v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bitrate(u64);

impl Bitrate {
    /// Create a bitrate from a raw bits-per-second value.
    pub const fn from_bps(bps: u64) -> Self {
        Self(bps)
    }

    /// Create a bitrate from kilobits per second.
    pub const fn from_kbps(kbps: u64) -> Self {
        Self(kbps * 1_000)
    }

    /// Bits per second.
    pub const fn bits_per_second(self) -> u64 {
        self.0
    }
}

impl FromStr for Bitrate {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || PresetError::InvalidBitrate(s.to_string());

        let (number, multiplier) = match trimmed.char_indices().last() {
            Some((i, 'k' | 'K')) => (&trimmed[..i], 1_000u64),
            Some((i, 'm' | 'M')) => (&trimmed[..i], 1_000_000u64),
            Some(_) => (trimmed, 1u64),
            None => return Err(invalid()),
        };

        if number.is_empty() {
            return Err(invalid());
        }

        if let Ok(whole) = number.parse::<u64>() {
            return whole.checked_mul(multiplier).map(Self).ok_or_else(invalid);
        }

        // Fractional forms like "7.5M"
        let value: f64 = number.parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        Ok(Self((value * multiplier as f64).round() as u64))
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 != 0 && self.0 % 1_000 == 0 {
            write!(f, "{}k", self.0 / 1_000)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Bitrate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bitrate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(bps) => Ok(Self(bps)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// One rendition of the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Unique name, also used as the rendition's file stem (`720p.m3u8`).
    pub name: String,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Encoder quality knob (CRF); lower means higher quality.
    #[serde(alias = "crf")]
    pub quality_factor: u8,
    /// Target video bitrate.
    pub bitrate: Bitrate,
}

impl Preset {
    /// Create a new preset.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        quality_factor: u8,
        bitrate: Bitrate,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            quality_factor,
            bitrate,
        }
    }

    /// The ffmpeg scale filter producing this preset's resolution.
    pub fn scale_expression(&self) -> String {
        format!("scale=w={}:h={}", self.width, self.height)
    }

    /// Value of the master playlist `BANDWIDTH` attribute.
    pub fn bandwidth(&self) -> u64 {
        self.bitrate.bits_per_second()
    }

    /// File name of this rendition's segment manifest.
    pub fn manifest_name(&self) -> String {
        format!("{}.{}", self.name, MANIFEST_EXTENSION)
    }

    fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// The ordered set of renditions a deployment offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(Vec<Preset>);

impl Catalog {
    /// Wrap an ordered list of presets. Call [`Catalog::validate`] before use
    /// if the list came from user input.
    pub fn new(presets: Vec<Preset>) -> Self {
        Self(presets)
    }

    /// The presets, in catalog order.
    pub fn presets(&self) -> &[Preset] {
        &self.0
    }

    /// Iterate presets in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Preset> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Check the invariants the rest of the pipeline relies on.
    ///
    /// - at least one preset
    /// - names unique and usable as file stems
    /// - no zero dimensions or bitrates
    /// - ordered from highest to lowest resolution
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(PresetError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for preset in &self.0 {
            if !is_valid_name(&preset.name) {
                return Err(PresetError::InvalidName(preset.name.clone()));
            }
            if !seen.insert(preset.name.as_str()) {
                return Err(PresetError::DuplicateName(preset.name.clone()));
            }
            if preset.width == 0 || preset.height == 0 || preset.bitrate.bits_per_second() == 0 {
                return Err(PresetError::ZeroValue(preset.name.clone()));
            }
        }

        for pair in self.0.windows(2) {
            if pair[1].pixels() > pair[0].pixels() {
                return Err(PresetError::OutOfOrder {
                    previous: pair[0].name.clone(),
                    next: pair[1].name.clone(),
                });
            }
        }

        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self(vec![
            Preset::new("4k", 3840, 2160, 18, Bitrate::from_kbps(12_000)),
            Preset::new("2k", 2560, 1440, 20, Bitrate::from_kbps(7_500)),
            Preset::new("1080p", 1920, 1080, 20, Bitrate::from_kbps(5_000)),
            Preset::new("720p", 1280, 720, 23, Bitrate::from_kbps(3_000)),
            Preset::new("480p", 854, 480, 26, Bitrate::from_kbps(1_500)),
            Preset::new("360p", 640, 360, 28, Bitrate::from_kbps(1_000)),
            Preset::new("144p", 256, 144, 32, Bitrate::from_kbps(300)),
        ])
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Preset;
    type IntoIter = std::slice::Iter<'a, Preset>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != MASTER_MANIFEST_STEM
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
