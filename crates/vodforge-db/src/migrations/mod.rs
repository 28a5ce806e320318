//! Schema migrations.
//!
//! SQL files are embedded with `include_str!` and applied in version order.
//! Applied versions are tracked in `schema_migrations`, so running the set
//! again is a no-op.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration {0} failed: {1}")]
    Failed(usize, String),
}

struct Migration {
    version: usize,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "videos",
    sql: include_str!("001_videos.sql"),
}];

fn ensure_tracking_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
}

fn applied_version(conn: &Connection) -> rusqlite::Result<usize> {
    conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
        row.get::<_, Option<usize>>(0)
    })
    .map(Option::unwrap_or_default)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), MigrationError> {
    let failed = |e: rusqlite::Error| MigrationError::Failed(migration.version, e.to_string());

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql).map_err(failed)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![migration.version, migration.name],
    )
    .map_err(failed)?;
    tx.commit().map_err(failed)
}

/// Apply every migration newer than the recorded schema version.
///
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    ensure_tracking_table(conn)?;
    let current = applied_version(conn)?;

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration)?;
        applied += 1;
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "applied migration"
        );
    }

    Ok(applied)
}

/// The recorded schema version, without applying anything.
pub fn current_version(conn: &Connection) -> Result<usize, MigrationError> {
    ensure_tracking_table(conn)?;
    Ok(applied_version(conn)?)
}

/// The newest version this binary knows about.
pub fn latest_version() -> usize {
    MIGRATIONS.last().map_or(0, |m| m.version)
}
