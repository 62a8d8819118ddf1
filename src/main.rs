//! Appcache CLI application
//!
//! Command-line interface for serving and rendering HTML5 application-cache
//! manifests.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use appcache::cli::{handle_render, handle_serve, handle_urls, Cli, Commands};
use appcache::config::AppConfig;
use appcache::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config);

    info!("Appcache v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve(args) => {
            info!("Executing serve command");
            handle_serve(args, config).await
        }
        Commands::Render(args) => {
            info!("Executing render command");
            handle_render(args, config).await
        }
        Commands::Urls(args) => {
            info!("Executing urls command");
            handle_urls(args).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
///
/// Falls back to the configured level when no verbosity flag is given.
fn init_logging(cli: &Cli, config: &AppConfig) {
    let global = &cli.global;
    let log_level = if global.quiet || global.verbose || global.very_verbose {
        cli.log_level().to_string().to_lowercase()
    } else {
        config.logging.level.clone()
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("appcache={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }
    if let Ok(directive) = format!("tower_http={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
