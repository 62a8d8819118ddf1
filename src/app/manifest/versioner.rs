//! Manifest version computation
//!
//! [`ManifestVersioner`] owns the tracked URL set and decides when the
//! manifest version changes. Every `hash()` call re-fetches every tracked URL
//! in registration order and feeds the bodies into one running SHA-1, so the
//! fingerprint is a function of the concatenated content and of the order
//! URLs were added in.
//!
//! The versioner does no locking of its own. Mutation and hashing take
//! `&mut self`; callers sharing it across tasks serialize access themselves
//! (the [`Appcache`](crate::app::Appcache) binder keeps it behind a mutex).

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sha1::{Digest, Sha1};
use tracing::{debug, info};
use url::Url;

use super::folder::folder_urls;
use super::types::{ManifestVersion, VersionState};
use crate::app::fetch::ContentFetcher;
use crate::app::hash::ContentHash;
use crate::errors::{ConfigurationError, ConfigurationResult, FetchResult, Result};

/// Tracks cacheable URLs and versions their combined content
#[derive(Debug)]
pub struct ManifestVersioner {
    /// Path the manifest itself is served at; never tracked
    manifest_url: String,
    /// Capability used to read each tracked URL
    fetcher: Arc<dyn ContentFetcher>,
    /// Tracked URLs in registration order
    urls: Vec<String>,
    /// Membership index over `urls`
    tracked: HashSet<String>,
    /// Prefixes that disqualify a candidate URL
    excluded: Vec<String>,
    state: VersionState,
    finalized: bool,
}

impl ManifestVersioner {
    /// Create an empty versioner for the manifest served at `manifest_url`
    pub fn new(manifest_url: impl Into<String>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            fetcher,
            urls: Vec::new(),
            tracked: HashSet::new(),
            excluded: Vec::new(),
            state: VersionState::default(),
            finalized: false,
        }
    }

    /// Track additional URLs
    ///
    /// Candidates starting with an excluded prefix are skipped silently and
    /// URLs already tracked are left where they are. Returns how many URLs
    /// were newly tracked.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Finalized` after [`finalize`](Self::finalize)
    /// - `ConfigurationError::SelfReference` if any candidate is the manifest
    ///   URL, whether or not it is excluded
    /// - `ConfigurationError::InvalidUrl` if any candidate is empty, contains
    ///   whitespace or control characters, or is neither a `/` path nor an
    ///   absolute `http(s)` URL
    ///
    /// The whole batch is checked before anything is inserted, so a rejected
    /// batch leaves the tracked set unchanged.
    pub fn add_urls<I, S>(&mut self, urls: I) -> ConfigurationResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_finalized()?;

        let candidates: Vec<String> = urls.into_iter().map(Into::into).collect();
        for url in &candidates {
            if self.is_self_reference(url) {
                return Err(ConfigurationError::SelfReference { url: url.clone() });
            }
            validate_url(url)?;
        }

        let mut added = 0;
        for url in candidates {
            if let Some(prefix) = self.excluded_by(&url) {
                debug!("Skipping {} (excluded by prefix {})", url, prefix);
                continue;
            }

            if self.tracked.insert(url.clone()) {
                self.urls.push(url);
                added += 1;
            }
        }

        Ok(added)
    }

    /// Exclude every URL starting with one of `prefixes`
    ///
    /// Exclusion is checked when URLs are added, so register prefixes before
    /// the URLs they are meant to filter. URLs already tracked stay tracked.
    pub fn add_excluded_urls<I, S>(&mut self, prefixes: I) -> ConfigurationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_finalized()?;

        for prefix in prefixes {
            let prefix = prefix.into();
            if !self.excluded.contains(&prefix) {
                self.excluded.push(prefix);
            }
        }

        Ok(())
    }

    /// Stop tracking URLs, keeping the rest in registration order
    ///
    /// Returns how many URLs were removed; unknown URLs are ignored.
    pub fn remove_urls<I, S>(&mut self, urls: I) -> ConfigurationResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check_finalized()?;

        let mut removed = 0;
        for url in urls {
            if self.tracked.remove(url.as_ref()) {
                removed += 1;
            }
        }

        if removed > 0 {
            let tracked = &self.tracked;
            self.urls.retain(|url| tracked.contains(url));
        }

        Ok(removed)
    }

    /// Track every regular file under `folder`, served under `base`
    ///
    /// `add_folder("media", "/static")` tracks `media/js/app.js` as
    /// `/static/js/app.js`. Derived URLs go through [`add_urls`](Self::add_urls),
    /// so exclusion and self-reference checks apply.
    pub fn add_folder(&mut self, folder: impl AsRef<Path>, base: &str) -> Result<usize> {
        self.check_finalized()?;

        let urls = folder_urls(folder.as_ref(), base)?;
        Ok(self.add_urls(urls)?)
    }

    /// Compute the current fingerprint
    ///
    /// Fetches every tracked URL, in registration order, into a single SHA-1
    /// accumulator. If the digest differs from the previous one it becomes
    /// the new version, stamped with the current time; otherwise the previous
    /// version (and its timestamp) is returned unchanged.
    ///
    /// After [`finalize`](Self::finalize) this returns the frozen version
    /// without fetching.
    ///
    /// # Errors
    ///
    /// Returns the first `ContentFetchError`. The stored version is left
    /// exactly as it was.
    pub async fn hash(&mut self) -> FetchResult<ManifestVersion> {
        if self.finalized {
            if let Some(version) = self.state.current() {
                return Ok(version.clone());
            }
        }

        let mut hasher = Sha1::new();
        for url in &self.urls {
            let content = self.fetcher.fetch(url).await?;
            hasher.update(&content);
        }

        let digest = ContentHash::from_hasher(hasher);
        let (version, changed) = self.state.record(digest, Utc::now());
        if changed {
            info!(
                "Manifest version is now {} ({} urls, updated {})",
                version.hash,
                self.urls.len(),
                version.updated_string()
            );
        } else {
            debug!("Manifest version unchanged at {}", version.hash);
        }

        Ok(version)
    }

    /// Compute the fingerprint once and freeze the versioner
    ///
    /// Afterwards `hash()` no longer fetches and every mutation fails with
    /// `ConfigurationError::Finalized`. If the computation fails the
    /// versioner stays mutable.
    pub async fn finalize(&mut self) -> FetchResult<ManifestVersion> {
        let version = self.hash().await?;
        if !self.finalized {
            info!("Manifest finalized at version {}", version.hash);
            self.finalized = true;
        }
        Ok(version)
    }

    /// Tracked URLs in registration order
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Whether `url` is tracked
    pub fn contains(&self, url: &str) -> bool {
        self.tracked.contains(url)
    }

    /// Number of tracked URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether no URL is tracked
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Registered exclusion prefixes
    pub fn excluded_prefixes(&self) -> &[String] {
        &self.excluded
    }

    /// Path the manifest is served at
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    /// Last computed version, without fetching
    pub fn current(&self) -> Option<&ManifestVersion> {
        self.state.current()
    }

    /// Whether [`finalize`](Self::finalize) has succeeded
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn excluded_by(&self, url: &str) -> Option<&str> {
        self.excluded
            .iter()
            .find(|prefix| url.starts_with(prefix.as_str()))
            .map(String::as_str)
    }

    /// The manifest path itself, or an absolute URL pointing at it
    fn is_self_reference(&self, url: &str) -> bool {
        url == self.manifest_url
            || Url::parse(url).is_ok_and(|parsed| {
                parsed.path() == self.manifest_url && parsed.query().is_none()
            })
    }

    fn check_finalized(&self) -> ConfigurationResult<()> {
        if self.finalized {
            Err(ConfigurationError::Finalized)
        } else {
            Ok(())
        }
    }
}

/// Check that `url` fits on a single manifest line and resolves unambiguously
fn validate_url(url: &str) -> ConfigurationResult<()> {
    let reason = if url.is_empty() {
        "URL is empty"
    } else if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        "URL contains whitespace or control characters"
    } else if url.starts_with('/') {
        return Ok(());
    } else {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => return Ok(()),
            _ => "URL must be a path starting with '/' or an absolute http(s) URL",
        }
    };

    Err(ConfigurationError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    })
}
