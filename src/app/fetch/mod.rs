//! Content-fetch capability used by the manifest versioner
//!
//! The versioner never talks to the network itself. It asks a
//! [`ContentFetcher`] for the current bytes behind each tracked URL and folds
//! them into the fingerprint. Three implementations ship with the crate:
//!
//! - [`RouterFetcher`]: dispatches in-process through the host `axum::Router`
//! - [`HttpFetcher`]: issues real HTTP requests with `reqwest`
//! - [`MemoryFetcher`]: serves a fixed map of URLs, for tests and embedding
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: network fetches
//! - `router`: in-process dispatch with redirect following
//! - `memory`: in-memory pages

use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::errors::{ContentFetchError, FetchResult};

pub mod config;
pub mod http;
pub mod memory;
pub mod router;

pub use config::FetchConfig;
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;
pub use router::RouterFetcher;

/// Retrieves the current content of a tracked URL
///
/// Implementations follow redirects and report any non-success status as
/// [`ContentFetchError::Status`] naming the requested URL.
#[async_trait]
pub trait ContentFetcher: fmt::Debug + Send + Sync {
    /// Fetch the body currently served for `url`
    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>>;
}

/// Resolve a tracked URL against the base URL used for fetches
///
/// Absolute URLs are returned unchanged; paths are joined onto `base`.
pub fn resolve_url(base: &Url, url: &str) -> FetchResult<Url> {
    base.join(url).map_err(|e| ContentFetchError::InvalidUrl {
        url: url.to_string(),
        error: e.to_string(),
    })
}
