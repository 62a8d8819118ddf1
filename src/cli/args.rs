//! Command-line argument parsing for appcache
//!
//! This module defines the CLI structure using clap derive macros: serving a
//! static site with its manifest, rendering a manifest for a running site, and
//! previewing folder expansion.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::FolderMount;
use crate::config::AppConfig;

/// Appcache - HTML5 application-cache manifest generator
#[derive(Parser, Debug)]
#[command(
    name = "appcache",
    version,
    about = "Generate and version HTML5 application-cache manifests",
    long_about = "Tracks the URLs a site wants cached offline, fingerprints their content and
serves a manifest whose version changes whenever that content does."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve a static directory together with its manifest
    Serve(ServeArgs),

    /// Fetch a running site and print its manifest
    Render(RenderArgs),

    /// List the URLs a folder expands to
    Urls(UrlsArgs),
}

/// Manifest options shared by `serve` and `render`
#[derive(Args, Debug, Clone, Default)]
pub struct ManifestArgs {
    /// Path the manifest is served at
    #[arg(long = "manifest-url", value_name = "PATH")]
    pub url: Option<String>,

    /// Template used to render the manifest
    #[arg(long, value_name = "NAME")]
    pub template: Option<String>,

    /// Directory holding manifest templates
    #[arg(long, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// URL to track (repeatable)
    #[arg(short = 'u', long = "cache-url", value_name = "URL")]
    pub cached_urls: Vec<String>,

    /// URL prefix to exclude (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PREFIX")]
    pub excluded_urls: Vec<String>,
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Address to listen on
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Directory served as static files
    #[arg(short = 'd', long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// URL prefix the static directory is served under
    #[arg(long, value_name = "PREFIX")]
    pub static_base: Option<String>,

    /// Do not track the static directory's files
    #[arg(long)]
    pub no_track_static: bool,

    /// Send `no-cache` instead of `must-revalidate`
    #[arg(long)]
    pub debug: bool,

    /// Freeze the manifest version at startup
    #[arg(long)]
    pub finalize: bool,
}

/// Arguments for the render command
#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Base URL of the running site
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Local folder whose files are tracked (repeatable)
    #[arg(long = "folder", value_name = "DIR")]
    pub folders: Vec<PathBuf>,

    /// URL prefix for `--folder` files
    #[arg(long, default_value = "/static", value_name = "PREFIX")]
    pub folder_base: String,

    /// Write the manifest to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the urls command
#[derive(Args, Debug, Clone)]
pub struct UrlsArgs {
    /// Folder to expand
    #[arg(value_name = "DIR")]
    pub folder: PathBuf,

    /// URL prefix the folder is served under
    #[arg(long, default_value = "/static", value_name = "PREFIX")]
    pub base: String,

    /// URL prefix to exclude (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PREFIX")]
    pub excluded_urls: Vec<String>,

    /// Print the URLs as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl ManifestArgs {
    /// Apply CLI overrides on top of the loaded configuration
    ///
    /// Scalar flags replace configured values; URL lists extend them.
    pub fn apply(&self, config: &mut AppConfig) {
        let appcache = &mut config.appcache;

        if let Some(url) = &self.url {
            appcache.url = url.clone();
        }
        if let Some(template) = &self.template {
            appcache.template = template.clone();
        }
        if let Some(dir) = &self.template_dir {
            appcache.template_dir = Some(dir.clone());
        }
        appcache.cached_urls.extend(self.cached_urls.iter().cloned());
        appcache
            .excluded_urls
            .extend(self.excluded_urls.iter().cloned());
    }
}

impl ServeArgs {
    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        self.manifest.apply(config);

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = dir.clone();
        }
        if let Some(base) = &self.static_base {
            config.server.static_base = base.clone();
        }
        if self.debug {
            config.appcache.debug = true;
        }
        // Fetches go back through the in-process router; a configured base
        // only changes the Host they carry
        if config.appcache.url_base == crate::constants::DEFAULT_URL_BASE {
            config.appcache.url_base = format!("http://{}", config.server.bind);
        } else {
            tracing::debug!(
                "Keeping configured url_base {} for in-process fetches",
                config.appcache.url_base
            );
        }
    }
}

impl RenderArgs {
    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        self.manifest.apply(config);

        if let Some(base_url) = &self.base_url {
            config.appcache.url_base = base_url.clone();
        }
        config.appcache.folders.extend(
            self.folders
                .iter()
                .map(|path| FolderMount::new(path.clone(), self.folder_base.clone())),
        );
    }
}
