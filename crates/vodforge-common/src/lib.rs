//! Vodforge-Common: Shared types and utilities.
//!
//! This crate provides the pieces every other vodforge crate agrees on:
//!
//! - **Typed IDs**: [`JobId`], the opaque per-upload identifier that namespaces
//!   a job's output directory
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use vodforge_common::{Error, JobId, Result};
//!
//! let job_id = JobId::new();
//! assert_eq!(job_id.to_string().len(), 36);
//!
//! fn lookup() -> Result<()> {
//!     Err(Error::not_found("video 7"))
//! }
//! assert!(lookup().is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
