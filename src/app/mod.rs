//! Core application logic for appcache
//!
//! This module contains the content fetchers, the manifest versioner and
//! renderer, and the binder that mounts the manifest route on an `axum`
//! router.
//!
//! # Examples
//!
//! ```rust,no_run
//! use appcache::app::{Appcache, AppcacheConfig};
//! use axum::{routing::get, Router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let site = Router::new()
//!     .route("/", get(|| async { "Hello" }))
//!     .route("/app.js", get(|| async { "console.log('offline')" }));
//!
//! let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone())?;
//! appcache.add_urls(["/", "/app.js"]).await?;
//!
//! println!("{}", appcache.render().await?);
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod fetch;
pub mod hash;
pub mod manifest;

// Re-export main public API
pub use binder::Appcache;
pub use fetch::{ContentFetcher, FetchConfig, HttpFetcher, MemoryFetcher, RouterFetcher};
pub use hash::ContentHash;
pub use manifest::{
    folder_urls, AppcacheConfig, FolderMount, ManifestRenderer, ManifestVersion,
    ManifestVersioner,
};
