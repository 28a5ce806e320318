//! Read side of the video catalogue.

use vodforge_common::{Error, Result};
use vodforge_db::{pool, queries::videos, DbPool, VideoRecord};

/// Lists and looks up published videos.
#[derive(Clone)]
pub struct VideoLibrary {
    db: DbPool,
}

impl VideoLibrary {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Every published video, most recent first. An empty library is an
    /// empty list.
    pub fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        let conn = pool::get_conn(&self.db)?;
        videos::list_videos(&conn)
    }

    pub fn get_video(&self, id: i64) -> Result<VideoRecord> {
        let conn = pool::get_conn(&self.db)?;
        videos::get_video(&conn, id)?.ok_or_else(|| Error::not_found(format!("Video {id} not found")))
    }
}
