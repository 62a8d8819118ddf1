//! Prelude module for the appcache library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use appcache::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use appcache::prelude::*;
//! use axum::{routing::get, Router};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let site = Router::new().route("/", get(|| async { "Hello" }));
//!
//!     let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone())?;
//!     appcache.add_urls(["/"]).await?;
//!     let _app = appcache.init_app(site);
//!
//!     // Continue with server setup...
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppcacheError, ConfigurationError, ContentFetchError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    // Route binding
    Appcache,
    AppcacheConfig,

    // Content fetching
    ContentFetcher,
    ContentHash,
    FetchConfig,
    FolderMount,
    HttpFetcher,
    ManifestRenderer,
    ManifestVersion,

    // Versioning
    ManifestVersioner,
    MemoryFetcher,
    RouterFetcher,
};

// Configuration loading
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{CONTENT_TYPE, DEFAULT_URL, DEFAULT_URL_BASE, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

// Common external crate re-exports for convenience
pub use tokio;
