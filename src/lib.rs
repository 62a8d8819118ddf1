//! Appcache Library
//!
//! A Rust library for generating and versioning HTML5 application-cache
//! manifests. Tracks the URLs a site wants cached, fingerprints their content
//! and serves a manifest whose version changes whenever that content does.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppcacheError, Result};
