//! Database connection pool management.
//!
//! SQLite behind an r2d2 pool. Every pool runs pending migrations before it
//! is handed out.

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use vodforge_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default pool size when the caller has no opinion.
pub const DEFAULT_POOL_SIZE: u32 = 8;

fn customize(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

fn build(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager.with_init(customize))
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = get_conn(&pool)?;
    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// Open (creating if needed) the database at `db_path` with up to
/// `max_size` connections, and bring its schema up to date.
///
/// # Example
///
/// ```no_run
/// use vodforge_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/vodforge/vodforge.db".as_ref(), 8).unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &Path, max_size: u32) -> Result<DbPool> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    build(SqliteConnectionManager::file(db_path), max_size)
}

/// Initialize an in-memory database pool for testing.
///
/// Plain `:memory:` gives every pooled connection its own empty database, so
/// this uses a uniquely named shared-cache URI instead. The database lives
/// as long as the pool holds a connection.
///
/// ```
/// use vodforge_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let uri = format!(
        "file:vodforge-mem-{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    build(SqliteConnectionManager::file(uri), 4)
}

/// Get a connection from the pool.
///
/// This is a convenience wrapper around `pool.get()` that converts the
/// r2d2 error into our common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
