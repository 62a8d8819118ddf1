//! Command handlers for the appcache CLI
//!
//! This module implements the command handlers that coordinate between CLI
//! arguments, loaded configuration and the core application functionality.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::app::{
    Appcache, FolderMount, HttpFetcher, ManifestVersioner, MemoryFetcher, RouterFetcher,
};
use crate::cli::{RenderArgs, ServeArgs, UrlsArgs};
use crate::config::AppConfig;
use crate::errors::{AppcacheError, Result};

/// Handle the serve command
///
/// Serves the static directory and the manifest from one router. Tracked
/// content is fetched in-process through the same static routes.
pub async fn handle_serve(args: ServeArgs, mut config: AppConfig) -> Result<()> {
    args.apply(&mut config);
    let server = config.server.clone();

    let content = static_router(&server.static_dir, &server.static_base);

    if server.static_dir.is_dir() {
        if !args.no_track_static {
            config
                .appcache
                .folders
                .push(FolderMount::new(&server.static_dir, &server.static_base));
        }
    } else {
        warn!(
            "Static directory {} does not exist, serving the manifest only",
            server.static_dir.display()
        );
    }

    let fetcher = RouterFetcher::new(content.clone(), &config.appcache.url_base)?
        .with_max_redirects(config.client.max_redirects);
    let appcache = Appcache::new(config.appcache, Arc::new(fetcher))?;

    if args.finalize {
        let version = appcache.finalize().await?;
        info!("Manifest finalized at {}", version.hash);
    }

    let manifest_url = appcache.config().url.clone();
    let tracked = appcache.urls().await.len();
    let app = appcache
        .init_app(content)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&server.bind)
        .await
        .map_err(|e| AppcacheError::generic(format!("Failed to bind {}: {}", server.bind, e)))?;
    let addr = listener.local_addr()?;

    info!("Listening on {}", addr);
    println!("🚀 Serving {} on http://{}", server.static_dir.display(), addr);
    println!("   Manifest: http://{}{} ({} urls)", addr, manifest_url, tracked);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Handle the render command
///
/// Fetches every tracked URL from a running site and writes the manifest.
pub async fn handle_render(args: RenderArgs, mut config: AppConfig) -> Result<()> {
    args.apply(&mut config);

    let fetch_config = config.fetch_config()?;
    info!("Rendering manifest against {}", fetch_config.base_url);

    let fetcher = HttpFetcher::with_config(&fetch_config)?;
    let appcache = Appcache::new(config.appcache, Arc::new(fetcher))?;

    if appcache.urls().await.is_empty() {
        warn!("No URLs are tracked; the manifest will be empty");
    }

    let body = appcache.render().await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &body).await?;
            info!("Wrote manifest to {}", path.display());
        }
        None => print!("{}", body),
    }

    Ok(())
}

/// Handle the urls command
///
/// Dry run of folder expansion, with exclusions applied the way the
/// versioner applies them.
pub async fn handle_urls(args: UrlsArgs) -> Result<()> {
    let mut versioner = ManifestVersioner::new(
        crate::constants::DEFAULT_URL,
        Arc::new(MemoryFetcher::new()),
    );
    versioner.add_excluded_urls(args.excluded_urls.iter().cloned())?;
    let added = versioner.add_folder(&args.folder, &args.base)?;
    debug!("{} urls found under {}", added, args.folder.display());

    if args.json {
        let json = serde_json::to_string_pretty(versioner.urls())
            .map_err(|e| AppcacheError::generic(format!("Failed to encode urls: {}", e)))?;
        println!("{}", json);
    } else {
        for url in versioner.urls() {
            println!("{}", url);
        }
    }

    Ok(())
}

/// Router serving `dir` under `base`
fn static_router(dir: &Path, base: &str) -> Router {
    let base = base.trim_end_matches('/');
    let files = ServeDir::new(dir);

    if base.is_empty() {
        Router::new().fallback_service(files)
    } else {
        Router::new().nest_service(base, files)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    println!("\n🛑 Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_static_router_prefix() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "js").unwrap();

        let (status, body) = get_body(static_router(dir.path(), "/static/"), "/static/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "js");
    }

    #[tokio::test]
    async fn test_static_router_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "js").unwrap();

        let (status, body) = get_body(static_router(dir.path(), "/"), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "js");
    }

    #[tokio::test]
    async fn test_urls_missing_folder() {
        let args = UrlsArgs {
            folder: "/definitely/not/here".into(),
            base: "/static".to_string(),
            excluded_urls: Vec::new(),
            json: false,
        };
        assert!(handle_urls(args).await.is_err());
    }

    #[tokio::test]
    async fn test_render_to_file_without_urls() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("manifest.appcache");
        let args = RenderArgs {
            output: Some(output.clone()),
            folder_base: "/static".to_string(),
            ..Default::default()
        };

        handle_render(args, AppConfig::default()).await.unwrap();

        let body = fs::read_to_string(output).unwrap();
        assert!(body.starts_with("CACHE MANIFEST\n"));
        assert_eq!(body.lines().count(), 3);
    }
}
