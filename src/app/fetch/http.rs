//! Network content fetches
//!
//! Resolves tracked URLs against the configured base URL and issues a GET
//! through `reqwest`, which follows redirects up to the configured limit.
//! Unlike a download client there is no retry loop: each `hash()` call is
//! a fresh attempt and a failure surfaces immediately.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{resolve_url, ContentFetcher, FetchConfig};
use crate::errors::{ConfigurationResult, ContentFetchError, FetchResult};

/// Fetches tracked content from a running site over HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    max_redirects: usize,
}

impl HttpFetcher {
    /// Creates a fetcher with default client settings against `base_url`
    pub fn new(base_url: &str) -> ConfigurationResult<Self> {
        Self::with_config(&FetchConfig::with_base_url(base_url)?)
    }

    /// Creates a fetcher from an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the HTTP client cannot be built
    pub fn with_config(config: &FetchConfig) -> ConfigurationResult<Self> {
        let client = config.build_http_client()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_redirects: config.max_redirects,
        })
    }

    /// Base URL tracked paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>> {
        let target = resolve_url(&self.base_url, url)?;

        let response = self.client.get(target.as_str()).send().await.map_err(|e| {
            if e.is_redirect() {
                ContentFetchError::TooManyRedirects {
                    url: url.to_string(),
                    limit: self.max_redirects,
                }
            } else {
                ContentFetchError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Fetch of {} returned HTTP {}", url, status.as_u16());
            return Err(ContentFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ContentFetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Fetched {} ({} bytes) from {}", url, body.len(), target);
        Ok(body.to_vec())
    }
}
