//! Core types for manifest versioning
//!
//! This module contains the configuration of the manifest route and the
//! version state the versioner keeps between `hash()` calls.

use std::path::PathBuf;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::app::hash::ContentHash;
use crate::constants::manifest;

/// Configuration for the manifest route and its tracked content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppcacheConfig {
    /// Path serving the manifest
    pub url: String,
    /// Template used to render the manifest body
    pub template: String,
    /// Base URL used when fetching tracked content
    pub url_base: String,
    /// Directory of user templates overriding the built-in one
    pub template_dir: Option<PathBuf>,
    /// Send `no-cache` instead of `must-revalidate`
    pub debug: bool,
    /// URLs tracked at startup
    pub cached_urls: Vec<String>,
    /// Prefixes excluded at startup
    pub excluded_urls: Vec<String>,
    /// Folders expanded into tracked URLs at startup
    pub folders: Vec<FolderMount>,
}

impl Default for AppcacheConfig {
    fn default() -> Self {
        Self {
            url: manifest::DEFAULT_URL.to_string(),
            template: manifest::DEFAULT_TEMPLATE.to_string(),
            url_base: manifest::DEFAULT_URL_BASE.to_string(),
            template_dir: None,
            debug: false,
            cached_urls: Vec::new(),
            excluded_urls: Vec::new(),
            folders: Vec::new(),
        }
    }
}

/// A local folder served under a URL prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMount {
    /// Folder on disk
    pub path: PathBuf,
    /// URL prefix the folder is served under
    #[serde(default = "default_folder_base")]
    pub base: String,
}

impl FolderMount {
    /// Mount `path` under `base`
    pub fn new(path: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
        }
    }
}

fn default_folder_base() -> String {
    manifest::DEFAULT_FOLDER_BASE.to_string()
}

/// The fingerprint of the tracked content and when it last changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestVersion {
    /// SHA-1 over the concatenated content of every tracked URL
    pub hash: ContentHash,
    /// When `hash` last took a new value
    pub updated: DateTime<Utc>,
}

impl ManifestVersion {
    /// RFC 3339 timestamp with microsecond precision, as written into the
    /// manifest
    pub fn updated_string(&self) -> String {
        self.updated.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// Last computed version, empty until the first successful `hash()`
#[derive(Debug, Clone, Default)]
pub(crate) struct VersionState {
    last: Option<ManifestVersion>,
}

impl VersionState {
    /// Current version, if one was ever computed
    pub(crate) fn current(&self) -> Option<&ManifestVersion> {
        self.last.as_ref()
    }

    /// Record a freshly computed digest
    ///
    /// Leaves the state alone when `hash` matches the stored digest.
    /// Otherwise stores it with `now`, nudged one microsecond past the
    /// previous timestamp if the clock has not moved beyond it. Returns the
    /// current version and whether it changed.
    pub(crate) fn record(
        &mut self,
        hash: ContentHash,
        now: DateTime<Utc>,
    ) -> (ManifestVersion, bool) {
        if let Some(last) = &self.last {
            if last.hash == hash {
                return (last.clone(), false);
            }
        }

        let updated = match &self.last {
            Some(last) if now <= last.updated => last.updated + Duration::microseconds(1),
            _ => now,
        };
        let version = ManifestVersion { hash, updated };
        self.last = Some(version.clone());
        (version, true)
    }
}
