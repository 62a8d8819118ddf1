//! Configuration management for appcache
//!
//! This module provides multi-source configuration loading with zero-config
//! defaults: built-in values, then an optional TOML file, then `APPCACHE_*`
//! environment variables. CLI flags are applied on top by the commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::fetch::config::parse_base_url;
use crate::app::{AppcacheConfig, FetchConfig};
use crate::constants::{env, http, server};
use crate::errors::{AppcacheError, ConfigurationError, ConfigurationResult, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Manifest route and tracked content
    pub appcache: AppcacheConfig,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Settings for the `serve` command
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Maximum connections per host
    pub pool_max_per_host: usize,
    /// Maximum redirects followed per fetch
    pub max_redirects: usize,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            max_redirects: http::MAX_REDIRECTS,
        }
    }
}

/// Settings for the `serve` command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
    /// Directory served as static files
    pub static_dir: PathBuf,
    /// URL prefix the static directory is served under
    pub static_base: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: server::DEFAULT_BIND.to_string(),
            static_dir: PathBuf::from(server::DEFAULT_STATIC_DIR),
            static_base: crate::constants::manifest::DEFAULT_FOLDER_BASE.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (`config_file_override`, or `appcache.toml` if present)
    /// 3. Environment variables
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigurationError::FileNotFound { path }.into());
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => Self::default(),
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Look for a config file in the working directory
    fn find_config_file() -> Option<PathBuf> {
        let path = PathBuf::from(server::CONFIG_FILE_NAME);
        if path.exists() {
            debug!("Found config file: {}", path.display());
            Some(path)
        } else {
            debug!("No config file found, using defaults");
            None
        }
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppcacheError::generic(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigurationError::from)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Apply `APPCACHE_*` overrides from the process environment
    pub fn apply_env(&mut self) -> ConfigurationResult<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply `APPCACHE_*` overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> ConfigurationResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let appcache = &mut self.appcache;

        if let Some(url) = lookup(env::URL) {
            appcache.url = url;
        }
        if let Some(template) = lookup(env::TEMPLATE) {
            appcache.template = template;
        }
        if let Some(url_base) = lookup(env::URL_BASE) {
            appcache.url_base = url_base;
        }
        if let Some(dir) = lookup(env::TEMPLATE_DIR) {
            appcache.template_dir = Some(PathBuf::from(dir));
        }
        if let Some(debug) = lookup(env::DEBUG) {
            appcache.debug = parse_bool(env::DEBUG, &debug)?;
        }

        Ok(())
    }

    /// Runtime fetch configuration for content requests
    ///
    /// Uses `appcache.url_base` as the base for relative URLs.
    pub fn fetch_config(&self) -> ConfigurationResult<FetchConfig> {
        self.client.to_runtime_config(&self.appcache.url_base)
    }
}

impl ClientConfigToml {
    /// Convert to runtime FetchConfig
    pub fn to_runtime_config(&self, base_url: &str) -> ConfigurationResult<FetchConfig> {
        Ok(FetchConfig {
            base_url: parse_base_url(base_url)?,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            pool_max_per_host: self.pool_max_per_host,
            max_redirects: self.max_redirects,
        })
    }
}

fn parse_bool(field: &str, value: &str) -> ConfigurationResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigurationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected a boolean (true/false, yes/no, 1/0)".to_string(),
        }),
    }
}
