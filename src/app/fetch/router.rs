//! In-process content fetches through the host router
//!
//! Each tracked URL is turned into a GET request and dispatched straight into
//! the application's `axum::Router`, so the fingerprint reflects exactly what
//! the application would serve without opening a socket. Redirect responses
//! are followed in-process up to a fixed limit.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::Router;
use tower::ServiceExt;
use url::Url;

use super::{resolve_url, ContentFetcher};
use crate::constants::http;
use crate::errors::{ConfigurationResult, ContentFetchError, FetchResult};

/// Fetches tracked content by dispatching into an `axum::Router`
#[derive(Debug, Clone)]
pub struct RouterFetcher {
    router: Router,
    base_url: Url,
    max_redirects: usize,
}

impl RouterFetcher {
    /// Creates a fetcher dispatching into `router`, with request URLs built
    /// from `base_url`
    pub fn new(router: Router, base_url: &str) -> ConfigurationResult<Self> {
        Ok(Self {
            router,
            base_url: super::config::parse_base_url(base_url)?,
            max_redirects: http::MAX_REDIRECTS,
        })
    }

    /// Override the redirect limit
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    fn build_request(&self, url: &str, target: &Url) -> FetchResult<Request<Body>> {
        let host = match (target.host_str(), target.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        Request::builder()
            .method(Method::GET)
            .uri(target.as_str())
            .header(header::HOST, host)
            .header(header::USER_AGENT, http::USER_AGENT)
            .body(Body::empty())
            .map_err(|e| ContentFetchError::InvalidUrl {
                url: url.to_string(),
                error: e.to_string(),
            })
    }
}

#[async_trait]
impl ContentFetcher for RouterFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>> {
        let mut target = resolve_url(&self.base_url, url)?;

        for _ in 0..=self.max_redirects {
            let request = self.build_request(url, &target)?;
            let response = match self.router.clone().oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            };

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok());

                if let Some(location) = location {
                    tracing::debug!("{} redirected to {}", target, location);
                    target = target
                        .join(location)
                        .map_err(|e| ContentFetchError::InvalidUrl {
                            url: url.to_string(),
                            error: e.to_string(),
                        })?;
                    continue;
                }
            }

            if !status.is_success() {
                tracing::warn!("Fetch of {} returned HTTP {}", url, status.as_u16());
                return Err(ContentFetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = to_bytes(response.into_body(), http::MAX_BODY_BYTES)
                .await
                .map_err(|e| ContentFetchError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            tracing::debug!("Dispatched {} in-process ({} bytes)", url, body.len());
            return Ok(body.to_vec());
        }

        Err(ContentFetchError::TooManyRedirects {
            url: url.to_string(),
            limit: self.max_redirects,
        })
    }
}
