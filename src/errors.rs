//! Error types for appcache
//!
//! Usage mistakes surface as [`ConfigurationError`] the moment they are made.
//! Problems retrieving tracked content surface as [`ContentFetchError`] from
//! `hash()` and carry the offending URL. [`AppcacheError`] wraps both for the
//! host binder and the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid setup or misuse of the manifest versioner
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The manifest's own URL was added to the tracked set
    #[error("You should never put your appcache url into the appcache: {url}")]
    SelfReference { url: String },

    /// Tracked URL cannot appear on a manifest line
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Mutation attempted after `finalize()`
    #[error("Appcache has already been finalized")]
    Finalized,

    /// Manifest route path is unusable
    #[error("Invalid manifest URL: {url}. {reason}")]
    InvalidManifestUrl { url: String, reason: String },

    /// Base URL for content fetches does not parse
    #[error("Invalid base URL: {url} - {error}")]
    InvalidBaseUrl { url: String, error: String },

    /// Template could not be loaded or is not registered
    #[error("Invalid manifest template {name}: {reason}")]
    InvalidTemplate { name: String, reason: String },

    /// Folder handed to `add_folder` does not exist
    #[error("Folder not found: {path}")]
    FolderNotFound { path: PathBuf },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Failure to retrieve the current content of a tracked URL
#[derive(Error, Debug)]
pub enum ContentFetchError {
    /// Resource answered with a non-success status
    #[error("Appcache is broken: {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Request could not be completed
    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// Redirect chain exceeded the limit
    #[error("Too many redirects ({limit}) while fetching {url}")]
    TooManyRedirects { url: String, limit: usize },

    /// URL could not be resolved against the base URL
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

impl ContentFetchError {
    /// The tracked URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            ContentFetchError::Status { url, .. }
            | ContentFetchError::Transport { url, .. }
            | ContentFetchError::TooManyRedirects { url, .. }
            | ContentFetchError::InvalidUrl { url, .. } => url,
        }
    }

    /// HTTP status reported by the resource, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ContentFetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Top-level error that can represent any error type
#[derive(Error, Debug)]
pub enum AppcacheError {
    /// Configuration or usage error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Content fetch error
    #[error(transparent)]
    ContentFetch(#[from] ContentFetchError),

    /// Manifest rendering failed
    #[error("Failed to render manifest template")]
    Template(#[from] tera::Error),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppcacheError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is transient and a later attempt may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppcacheError::ContentFetch(ContentFetchError::Transport { .. }) => true,
            AppcacheError::ContentFetch(ContentFetchError::Status { status, .. }) => {
                *status >= 500 || *status == 429
            }
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppcacheError::Configuration(_) => "configuration",
            AppcacheError::ContentFetch(_) => "fetch",
            AppcacheError::Template(_) => "template",
            AppcacheError::Io(_) => "io",
            AppcacheError::Generic { .. } => "generic",
        }
    }
}

impl From<walkdir::Error> for AppcacheError {
    fn from(error: walkdir::Error) -> Self {
        AppcacheError::Io(error.into())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppcacheError>;

/// Configuration result type alias
pub type ConfigurationResult<T> = std::result::Result<T, ConfigurationError>;

/// Content fetch result type alias
pub type FetchResult<T> = std::result::Result<T, ContentFetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_url() {
        let error = ContentFetchError::Status {
            url: "/missing.js".to_string(),
            status: 404,
        };
        assert_eq!(error.url(), "/missing.js");
        assert_eq!(error.status(), Some(404));
        assert!(error.to_string().contains("/missing.js"));
        assert!(error.to_string().contains("404"));

        let error = ContentFetchError::TooManyRedirects {
            url: "/loop".to_string(),
            limit: 10,
        };
        assert_eq!(error.url(), "/loop");
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_recoverability() {
        let server_error = AppcacheError::from(ContentFetchError::Status {
            url: "/".to_string(),
            status: 503,
        });
        assert!(server_error.is_recoverable());

        let not_found = AppcacheError::from(ContentFetchError::Status {
            url: "/".to_string(),
            status: 404,
        });
        assert!(!not_found.is_recoverable());

        let finalized = AppcacheError::from(ConfigurationError::Finalized);
        assert!(!finalized.is_recoverable());
        assert_eq!(finalized.category(), "configuration");
    }

    #[test]
    fn test_self_reference_message() {
        let error = ConfigurationError::SelfReference {
            url: "/manifest.appcache".to_string(),
        };
        assert!(error.to_string().contains("never put your appcache url"));
    }
}
