//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used to fetch tracked content from a running site.

use std::time::Duration;

use reqwest::{redirect, Client};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{http, manifest};
use crate::errors::{ConfigurationError, ConfigurationResult};

/// Configuration for content fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL tracked paths are resolved against
    pub base_url: Url,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// Maximum redirects followed per fetch
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(manifest::DEFAULT_URL_BASE).expect("Base URL should be valid"),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            max_redirects: http::MAX_REDIRECTS,
        }
    }
}

impl FetchConfig {
    /// Default configuration pointed at a different base URL
    pub fn with_base_url(base_url: &str) -> ConfigurationResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Default::default()
        })
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ConfigurationResult<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .redirect(redirect::Policy::limited(self.max_redirects))
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder
            .build()
            .map_err(|e| ConfigurationError::InvalidValue {
                field: "client".to_string(),
                value: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Parse and validate a base URL for content fetches
pub fn parse_base_url(base_url: &str) -> ConfigurationResult<Url> {
    let parsed = Url::parse(base_url).map_err(|e| ConfigurationError::InvalidBaseUrl {
        url: base_url.to_string(),
        error: e.to_string(),
    })?;

    if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidBaseUrl {
            url: base_url.to_string(),
            error: "expected an http or https URL".to_string(),
        });
    }

    Ok(parsed)
}
