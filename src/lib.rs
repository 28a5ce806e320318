//! vodforge - upload-to-HLS transcoding service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod library;
pub mod server;
pub mod transcode;
