//! Vodforge-DB: Database schema, migrations, and query operations
//!
//! SQLite via rusqlite with r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Embedded schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use vodforge_db::pool::{init_pool, get_conn};
//! use vodforge_db::queries::videos;
//!
//! let pool = init_pool("vodforge.db".as_ref(), 8).unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let video = videos::insert_video(&conn, "Launch demo", "public/abc/index.m3u8").unwrap();
//! println!("Registered video {}", video.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

pub use models::VideoRecord;
pub use pool::{DbPool, PooledConnection};
