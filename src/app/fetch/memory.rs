//! In-memory content pages

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ContentFetcher;
use crate::errors::{ContentFetchError, FetchResult};

#[derive(Debug, Clone)]
enum Page {
    Content(Vec<u8>),
    Status(u16),
}

/// Serves tracked content from an in-memory map
///
/// Unknown URLs answer HTTP 404. Clones share the same pages, so a test can
/// keep a handle and change content between `hash()` calls.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    pages: Arc<RwLock<HashMap<String, Page>>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryFetcher {
    /// Creates an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher pre-populated with `(url, content)` pairs
    pub fn from_pages<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let pages = pages
            .into_iter()
            .map(|(url, content)| (url.into(), Page::Content(content.into())))
            .collect();

        Self {
            pages: Arc::new(RwLock::new(pages)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the content served for `url`
    pub async fn insert(&self, url: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.pages
            .write()
            .await
            .insert(url.into(), Page::Content(content.into()));
    }

    /// Make `url` answer with a non-success status
    pub async fn fail_with(&self, url: impl Into<String>, status: u16) {
        self.pages
            .write()
            .await
            .insert(url.into(), Page::Status(status));
    }

    /// Forget `url`, making it answer 404
    pub async fn remove(&self, url: &str) {
        self.pages.write().await.remove(url);
    }

    /// Number of fetches served so far, across all clones
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        match self.pages.read().await.get(url) {
            Some(Page::Content(content)) => Ok(content.clone()),
            Some(Page::Status(status)) => Err(ContentFetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ContentFetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_pages() {
        let fetcher = MemoryFetcher::from_pages([("/", "yay")]);
        assert_eq!(fetcher.fetch("/").await.unwrap(), b"yay");
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_url_is_not_found() {
        let fetcher = MemoryFetcher::new();
        let error = fetcher.fetch("/missing").await.unwrap_err();
        assert_eq!(error.status(), Some(404));
    }

    #[tokio::test]
    async fn test_clones_share_pages() {
        let fetcher = MemoryFetcher::new();
        let handle = fetcher.clone();

        handle.insert("/app.js", "v1").await;
        assert_eq!(fetcher.fetch("/app.js").await.unwrap(), b"v1");

        handle.fail_with("/app.js", 500).await;
        assert_eq!(fetcher.fetch("/app.js").await.unwrap_err().status(), Some(500));

        handle.remove("/app.js").await;
        assert_eq!(fetcher.fetch("/app.js").await.unwrap_err().status(), Some(404));
        assert_eq!(handle.fetch_count(), 3);
    }
}
