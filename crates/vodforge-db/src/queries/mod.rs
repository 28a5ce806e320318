//! Database query modules.
//!
//! - videos: the published video registry

pub mod videos;
