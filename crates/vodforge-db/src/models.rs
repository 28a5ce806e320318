//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published video: a title and where its master manifest lives.
///
/// Rows are inserted once, after every rendition exists, and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    pub id: i64,
    pub title: String,
    pub master_manifest_path: String,
    pub created_at: DateTime<Utc>,
}
