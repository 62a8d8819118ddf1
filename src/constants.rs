//! Application constants for appcache
//!
//! This module centralizes all constants used throughout the crate,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names recognised by the configuration loader
pub mod env {
    /// Path serving the manifest
    pub const URL: &str = "APPCACHE_URL";

    /// Template used to render the manifest body
    pub const TEMPLATE: &str = "APPCACHE_TEMPLATE";

    /// Base URL used when fetching tracked content
    pub const URL_BASE: &str = "APPCACHE_URL_BASE";

    /// Directory holding user-supplied manifest templates
    pub const TEMPLATE_DIR: &str = "APPCACHE_TEMPLATE_DIR";

    /// Debug mode switch (`no-cache` instead of `must-revalidate`)
    pub const DEBUG: &str = "APPCACHE_DEBUG";
}

/// Manifest defaults and wire format
pub mod manifest {
    /// Default path serving the manifest
    pub const DEFAULT_URL: &str = "/manifest.appcache";

    /// Default template name
    pub const DEFAULT_TEMPLATE: &str = "manifest.appcache";

    /// Default base URL for content fetches
    pub const DEFAULT_URL_BASE: &str = "http://localhost";

    /// Default URL prefix for folder expansion
    pub const DEFAULT_FOLDER_BASE: &str = "/static";

    /// `Content-Type` header value of the manifest response
    pub const CONTENT_TYPE: &str = "text/cache-manifest; charset=utf-8";

    /// Built-in manifest template
    ///
    /// One tracked URL renders to exactly four lines.
    pub const BUILTIN_TEMPLATE: &str = "CACHE MANIFEST\n# {{ hash }}\n{% for url in urls %}{{ url }}\n{% endfor %}# updated {{ updated }}\n";
}

/// HTTP client and dispatch constants
pub mod http {
    use super::Duration;

    /// Default user agent for content fetches
    pub const USER_AGENT: &str = concat!("appcache/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;

    /// Maximum number of redirects to follow
    pub const MAX_REDIRECTS: usize = 10;

    /// Largest response body accepted from in-process dispatch
    pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;
}

/// Server defaults for the `serve` command
pub mod server {
    /// Default bind address
    pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

    /// Default static directory
    pub const DEFAULT_STATIC_DIR: &str = "static";

    /// Default configuration file name looked up in the working directory
    pub const CONFIG_FILE_NAME: &str = "appcache.toml";
}

// Re-export commonly used constants at module level for convenience
pub use http::USER_AGENT;
pub use manifest::{CONTENT_TYPE, DEFAULT_URL, DEFAULT_URL_BASE};
