//! Ladder selection.
//!
//! Given the catalog and the probed dimensions of a source, pick every preset
//! the source can actually fill. Upscaling is never useful for adaptive
//! streaming, so a preset qualifies only when the source is at least as wide
//! *and* at least as tall as the preset.

use crate::presets::{Catalog, Preset};
use serde::{Deserialize, Serialize};

/// Dimensions of a source's primary video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceProfile {
    pub width: u32,
    pub height: u32,
}

impl SourceProfile {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether this source is large enough on both axes to produce `preset`.
    pub fn can_fill(&self, preset: &Preset) -> bool {
        self.width >= preset.width && self.height >= preset.height
    }
}

/// The presets chosen for one job, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ladder(Vec<Preset>);

impl Ladder {
    pub fn presets(&self) -> &[Preset] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Preset> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// An empty ladder means the source is below every configured rendition.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Preset names, in ladder order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Ladder {
    type Item = &'a Preset;
    type IntoIter = std::slice::Iter<'a, Preset>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Select the presets `source` can fill, preserving catalog order.
///
/// Total and deterministic: the same inputs always give the same ladder, and
/// an empty ladder is a normal result rather than an error.
pub fn select(catalog: &Catalog, source: &SourceProfile) -> Ladder {
    Ladder(
        catalog
            .iter()
            .filter(|preset| source.can_fill(preset))
            .cloned()
            .collect(),
    )
}
