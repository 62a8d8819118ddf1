//! Manifest versioning and rendering
//!
//! This module maintains the set of URLs an HTML5 application cache should
//! hold, fingerprints their current content and renders the manifest text.
//!
//! # Module Organization
//!
//! - [`types`] - Configuration and version state (AppcacheConfig, ManifestVersion)
//! - [`versioner`] - The tracked URL set and fingerprint computation
//! - [`folder`] - Expansion of static folders into URLs
//! - [`render`] - Template rendering of the manifest body
//! - `tests` - Integration tests against an in-process router
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use appcache::app::fetch::MemoryFetcher;
//! use appcache::app::manifest::{ManifestRenderer, ManifestVersioner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = MemoryFetcher::from_pages([("/", "yay"), ("/app.js", "console.log(1)")]);
//! let mut versioner = ManifestVersioner::new("/manifest.appcache", Arc::new(fetcher));
//! versioner.add_urls(["/", "/app.js"])?;
//!
//! let version = versioner.hash().await?;
//! let body = ManifestRenderer::builtin()?.render(versioner.urls(), &version)?;
//! assert!(body.starts_with("CACHE MANIFEST\n"));
//! # Ok(())
//! # }
//! ```

pub mod folder;
pub mod render;
pub mod types;
pub mod versioner;

#[cfg(test)]
pub mod tests;

pub use folder::folder_urls;
pub use render::ManifestRenderer;
pub use types::{AppcacheConfig, FolderMount, ManifestVersion};
pub use versioner::ManifestVersioner;
