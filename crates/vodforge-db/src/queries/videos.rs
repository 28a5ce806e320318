//! Video registry queries.
//!
//! One `INSERT` per published job and one `SELECT` per read. Rows are never
//! updated in place.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use vodforge_common::{Error, Result};

use crate::models::VideoRecord;

const COLUMNS: &str = "id, title, master_manifest_path, created_at";

fn row_to_video(row: &Row) -> rusqlite::Result<VideoRecord> {
    let created_at: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(VideoRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        master_manifest_path: row.get(2)?,
        created_at,
    })
}

/// Register a published video.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `title` - Display title
/// * `master_manifest_path` - Location of the job's `index.m3u8`
///
/// # Returns
///
/// * `Ok(VideoRecord)` - The stored row, with its assigned id
/// * `Err(Error)` - If the insert fails
pub fn insert_video(
    conn: &Connection,
    title: &str,
    master_manifest_path: &str,
) -> Result<VideoRecord> {
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO videos (title, master_manifest_path, created_at)
         VALUES (:title, :path, :created_at)",
        rusqlite::named_params! {
            ":title": title,
            ":path": master_manifest_path,
            ":created_at": created_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(VideoRecord {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        master_manifest_path: master_manifest_path.to_string(),
        created_at,
    })
}

/// Get a video by id.
///
/// * `Ok(Some(VideoRecord))` - The video if found
/// * `Ok(None)` - If no such video exists
pub fn get_video(conn: &Connection, id: i64) -> Result<Option<VideoRecord>> {
    let result = conn.query_row(
        &format!("SELECT {COLUMNS} FROM videos WHERE id = :id"),
        rusqlite::named_params! { ":id": id },
        row_to_video,
    );

    match result {
        Ok(video) => Ok(Some(video)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List every video, most recently registered first.
pub fn list_videos(conn: &Connection) -> Result<Vec<VideoRecord>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM videos ORDER BY id DESC"))
        .map_err(|e| Error::database(e.to_string()))?;

    let videos = stmt
        .query_map([], row_to_video)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(videos)
}

/// Number of registered videos.
pub fn count_videos(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    #[test]
    fn test_insert_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let inserted = insert_video(&conn, "Launch demo", "public/abc/index.m3u8").unwrap();
        assert!(inserted.id > 0);

        let fetched = get_video(&conn, inserted.id).unwrap().unwrap();
        assert_eq!(fetched.id, inserted.id);
        assert_eq!(fetched.title, "Launch demo");
        assert_eq!(fetched.master_manifest_path, "public/abc/index.m3u8");
        assert_eq!(fetched.created_at.timestamp(), inserted.created_at.timestamp());
    }

    #[test]
    fn test_get_missing() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        assert!(get_video(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn test_list_most_recent_first() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        assert!(list_videos(&conn).unwrap().is_empty());

        for title in ["first", "second", "third"] {
            insert_video(&conn, title, &format!("public/{title}/index.m3u8")).unwrap();
        }

        let titles: Vec<String> = list_videos(&conn)
            .unwrap()
            .into_iter()
            .map(|v| v.title)
            .collect();
        assert_eq!(titles, ["third", "second", "first"]);
        assert_eq!(count_videos(&conn).unwrap(), 3);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let a = insert_video(&conn, "a", "p").unwrap();
        conn.execute("DELETE FROM videos WHERE id = ?1", [a.id]).unwrap();
        let b = insert_video(&conn, "b", "p").unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_corrupt_timestamp_is_an_error() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        conn.execute(
            "INSERT INTO videos (title, master_manifest_path, created_at) VALUES ('x', 'p', 'yesterday')",
            [],
        )
        .unwrap();

        assert!(matches!(list_videos(&conn), Err(Error::Database(_))));
    }
}
