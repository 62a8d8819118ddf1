//! Manifest route binding for `axum` applications
//!
//! [`Appcache`] wires a [`ManifestVersioner`] into a host router: it installs
//! the manifest route, renders the body on every request and forces clients to
//! revalidate every response passing through the router.
//!
//! # Examples
//!
//! ```rust,no_run
//! use appcache::app::{Appcache, AppcacheConfig};
//! use axum::{routing::get, Router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let site = Router::new().route("/", get(|| async { "Hello, offline world" }));
//!
//! let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone())?;
//! appcache.add_urls(["/"]).await?;
//!
//! // Install the manifest route last so the middleware covers every route
//! let app = appcache.init_app(site);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::app::fetch::{config::parse_base_url, ContentFetcher, RouterFetcher};
use crate::app::manifest::{AppcacheConfig, ManifestRenderer, ManifestVersion, ManifestVersioner};
use crate::constants::manifest;
use crate::errors::{AppcacheError, ConfigurationError, ConfigurationResult, FetchResult, Result};

/// Host binder serving an application-cache manifest
///
/// Cloning is cheap; clones share the same versioner.
#[derive(Debug, Clone)]
pub struct Appcache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: AppcacheConfig,
    renderer: ManifestRenderer,
    versioner: Mutex<ManifestVersioner>,
}

impl Appcache {
    /// Create a binder whose tracked content is read through `fetcher`
    ///
    /// Seeds the versioner from `config`: excluded prefixes first, then
    /// folders, then cached URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for an invalid manifest URL, base URL or
    /// template, or when the seeded URLs are rejected.
    pub fn new(config: AppcacheConfig, fetcher: Arc<dyn ContentFetcher>) -> Result<Self> {
        validate_manifest_url(&config.url)?;
        parse_base_url(&config.url_base)?;
        let renderer = ManifestRenderer::new(&config.template, config.template_dir.as_deref())?;

        let mut versioner = ManifestVersioner::new(config.url.clone(), fetcher);
        versioner.add_excluded_urls(config.excluded_urls.iter().cloned())?;
        for folder in &config.folders {
            versioner.add_folder(&folder.path, &folder.base)?;
        }
        versioner.add_urls(config.cached_urls.iter().cloned())?;

        info!(
            "Appcache manifest at {} tracking {} urls",
            config.url,
            versioner.len()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                renderer,
                versioner: Mutex::new(versioner),
            }),
        })
    }

    /// Create a binder fetching content in-process from `router`
    ///
    /// Pass the application's content routes; requests are built against
    /// `config.url_base`.
    pub fn for_router(config: AppcacheConfig, router: Router) -> Result<Self> {
        let fetcher = RouterFetcher::new(router, &config.url_base)?;
        Self::new(config, Arc::new(fetcher))
    }

    /// Configuration the binder was created with
    pub fn config(&self) -> &AppcacheConfig {
        &self.inner.config
    }

    /// Track additional URLs
    pub async fn add_urls<I, S>(&self, urls: I) -> ConfigurationResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.versioner.lock().await.add_urls(urls)
    }

    /// Exclude URLs by prefix from later additions
    pub async fn add_excluded_urls<I, S>(&self, prefixes: I) -> ConfigurationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.versioner.lock().await.add_excluded_urls(prefixes)
    }

    /// Stop tracking URLs
    pub async fn remove_urls<I, S>(&self, urls: I) -> ConfigurationResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.versioner.lock().await.remove_urls(urls)
    }

    /// Track every file under `folder`, served under `base`
    pub async fn add_folder(&self, folder: impl AsRef<Path>, base: &str) -> Result<usize> {
        self.inner.versioner.lock().await.add_folder(folder, base)
    }

    /// Tracked URLs in registration order
    pub async fn urls(&self) -> Vec<String> {
        self.inner.versioner.lock().await.urls().to_vec()
    }

    /// Compute the current version
    pub async fn hash(&self) -> FetchResult<ManifestVersion> {
        self.inner.versioner.lock().await.hash().await
    }

    /// Freeze the tracked set and precompute the version
    pub async fn finalize(&self) -> FetchResult<ManifestVersion> {
        self.inner.versioner.lock().await.finalize().await
    }

    /// Render the manifest body for the current content
    pub async fn render(&self) -> Result<String> {
        let mut versioner = self.inner.versioner.lock().await;
        let version = versioner.hash().await?;
        self.inner.renderer.render(versioner.urls(), &version)
    }

    /// Install the manifest route and the revalidation middleware
    ///
    /// The middleware only wraps routes already on `router`, so call this
    /// after the application's own routes are registered.
    pub fn init_app<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let appcache = self.clone();
        router
            .route(
                &self.inner.config.url,
                get(move || {
                    let appcache = appcache.clone();
                    async move { appcache.manifest_response().await }
                }),
            )
            .layer(middleware::map_response_with_state(
                self.inner.config.debug,
                apply_cache_headers,
            ))
    }

    async fn manifest_response(&self) -> Response {
        match self.render().await {
            Ok(body) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(manifest::CONTENT_TYPE),
                )],
                body,
            )
                .into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// Force revalidation on every response and drop `Expires`
///
/// Existing `Cache-Control` directives are kept; the revalidation directive
/// is appended if missing.
async fn apply_cache_headers(State(debug): State<bool>, mut response: Response) -> Response {
    let directive = if debug { "no-cache" } else { "must-revalidate" };
    let headers = response.headers_mut();

    let merged = match headers
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
    {
        Some(existing)
            if existing
                .split(',')
                .any(|d| d.trim().eq_ignore_ascii_case(directive)) =>
        {
            None
        }
        Some(existing) if !existing.trim().is_empty() => {
            Some(format!("{}, {}", existing.trim(), directive))
        }
        _ => Some(directive.to_string()),
    };

    if let Some(value) = merged.and_then(|v| HeaderValue::from_str(&v).ok()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers.remove(header::EXPIRES);

    response
}

fn validate_manifest_url(url: &str) -> ConfigurationResult<()> {
    let reason = if !url.starts_with('/') {
        "The manifest URL must be a path starting with '/'"
    } else if url.len() < 2 {
        "The manifest cannot be served at the site root"
    } else if url.chars().any(char::is_whitespace) {
        "The manifest URL must not contain whitespace"
    } else {
        return Ok(());
    };

    Err(ConfigurationError::InvalidManifestUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    })
}

impl IntoResponse for AppcacheError {
    fn into_response(self) -> Response {
        error!("Failed to serve manifest ({}): {}", self.category(), self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
            self.to_string(),
        )
            .into_response()
    }
}
