//! End-to-end tests of the manifest route mounted on an `axum` application
//!
//! Each test builds a small site, binds an [`Appcache`] to it and drives the
//! combined router with `tower::ServiceExt::oneshot`.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use appcache::app::{Appcache, AppcacheConfig, ContentHash, FolderMount};
use appcache::errors::{AppcacheError, ConfigurationError};
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::services::ServeDir;

fn static_folder() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("static1.js"), "Test").unwrap();
    fs::write(dir.path().join("static2.css"), "body { color: red; }").unwrap();
    dir
}

fn site(dir: &TempDir) -> Router {
    Router::new()
        .route("/", get(|| async { "yay" }))
        .nest_service("/static", ServeDir::new(dir.path()))
}

async fn get_response(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn manifest_lines(body: &str) -> Vec<&str> {
    body.lines().collect()
}

#[tokio::test]
async fn test_single_url_manifest() {
    let dir = static_folder();
    let site = site(&dir);

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    appcache.add_urls(["/static/static1.js"]).await.unwrap();
    let app = appcache.init_app(site);

    let response = get_response(&app, "/manifest.appcache").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/cache-manifest; charset=utf-8"
    );

    let body = body_string(response).await;
    let lines = manifest_lines(&body);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "CACHE MANIFEST");
    assert_eq!(lines[1], format!("# {}", ContentHash::of(b"Test")));
    assert_eq!(lines[2], "/static/static1.js");
    assert!(lines[3].starts_with("# updated "));
}

#[tokio::test]
async fn test_manifest_is_stable_between_requests() {
    let dir = static_folder();
    let site = site(&dir);

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    appcache.add_urls(["/", "/static/static2.css"]).await.unwrap();
    let app = appcache.init_app(site);

    let first = body_string(get_response(&app, "/manifest.appcache").await).await;
    let second = body_string(get_response(&app, "/manifest.appcache").await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_manifest_changes_with_content() {
    let flipped = Arc::new(AtomicBool::new(false));
    let site = Router::new()
        .route(
            "/",
            get(|State(flipped): State<Arc<AtomicBool>>| async move {
                if flipped.load(Ordering::SeqCst) {
                    "yay1"
                } else {
                    "yay"
                }
            }),
        )
        .with_state(Arc::clone(&flipped));

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    appcache.add_urls(["/"]).await.unwrap();
    let app = appcache.init_app(site);

    let before = body_string(get_response(&app, "/manifest.appcache").await).await;
    flipped.store(true, Ordering::SeqCst);
    let after = body_string(get_response(&app, "/manifest.appcache").await).await;

    let before = manifest_lines(&before);
    let after = manifest_lines(&after);
    assert_eq!(before[1], "# 4511f8c0e213c8ec51559eb4a1ffccbc7e42710e");
    assert_eq!(after[1], "# 01a286e91666539581e3a6daad9f12f0edf7a1ab");
    assert!(after[3] > before[3]);
}

#[tokio::test]
async fn test_revalidation_headers_on_site_routes() {
    let dir = static_folder();
    let site = site(&dir).route(
        "/expiring",
        get(|| async { ([(header::EXPIRES, "Thu, 01 Dec 1994 16:00:00 GMT")], "old") }),
    );

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    let app = appcache.init_app(site);

    for uri in ["/", "/static/static1.js", "/expiring", "/manifest.appcache"] {
        let response = get_response(&app, uri).await;
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "must-revalidate",
            "{uri}"
        );
        assert!(response.headers().get(header::EXPIRES).is_none(), "{uri}");
    }
}

#[tokio::test]
async fn test_self_reference_rejected() {
    let dir = static_folder();
    let appcache = Appcache::for_router(AppcacheConfig::default(), site(&dir)).unwrap();

    let result = appcache.add_urls(["/", "/manifest.appcache"]).await;
    assert!(matches!(result, Err(ConfigurationError::SelfReference { .. })));
    assert!(appcache.urls().await.is_empty());
}

#[tokio::test]
async fn test_invalid_urls_keep_manifest_lines_intact() {
    let dir = static_folder();
    let site = site(&dir);

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    appcache.add_urls(["/static/static1.js"]).await.unwrap();

    for url in ["", "/a\nNETWORK:\n*", "manifest.appcache"] {
        assert!(
            matches!(
                appcache.add_urls([url]).await,
                Err(ConfigurationError::InvalidUrl { .. })
            ),
            "Should reject: {:?}",
            url
        );
    }

    let body = appcache.render().await.unwrap();
    let lines = manifest_lines(&body);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[2], "/static/static1.js");
}

#[tokio::test]
async fn test_folder_names_with_spaces_are_fetched() {
    let dir = static_folder();
    fs::write(dir.path().join("my file.js"), "spaced").unwrap();
    let site = site(&dir);

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    appcache.add_folder(dir.path(), "/static").await.unwrap();
    assert_eq!(appcache.urls().await[0], "/static/my%20file.js");

    let version = appcache.hash().await.unwrap();
    assert_eq!(
        version.hash,
        ContentHash::of(b"spacedTestbody { color: red; }")
    );
}

#[tokio::test]
async fn test_missing_url_returns_server_error() {
    let dir = static_folder();
    let site = site(&dir);

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    appcache.add_urls(["/static/missing.js"]).await.unwrap();
    let app = appcache.init_app(site);

    let response = get_response(&app, "/manifest.appcache").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response).await.contains("/static/missing.js"));

    assert!(matches!(
        appcache.render().await,
        Err(AppcacheError::ContentFetch(_))
    ));
}

#[tokio::test]
async fn test_custom_manifest_url() {
    let dir = static_folder();
    let site = site(&dir);
    let config = AppcacheConfig {
        url: "/yay/manifest.appcache".to_string(),
        ..Default::default()
    };

    let appcache = Appcache::for_router(config, site.clone()).unwrap();
    appcache.add_urls(["/"]).await.unwrap();
    let app = appcache.init_app(site);

    let response = get_response(&app, "/yay/manifest.appcache").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_response(&app, "/manifest.appcache").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(matches!(
        appcache.add_urls(["/yay/manifest.appcache"]).await,
        Err(ConfigurationError::SelfReference { .. })
    ));
}

#[tokio::test]
async fn test_folder_expansion_from_config() {
    let dir = static_folder();
    let site = site(&dir);
    let config = AppcacheConfig {
        folders: vec![FolderMount::new(dir.path(), "/static")],
        cached_urls: vec!["/".to_string()],
        ..Default::default()
    };

    let appcache = Appcache::for_router(config, site.clone()).unwrap();
    assert_eq!(
        appcache.urls().await,
        vec!["/static/static1.js", "/static/static2.css", "/"]
    );

    let app = appcache.init_app(site);
    let body = body_string(get_response(&app, "/manifest.appcache").await).await;
    let lines = manifest_lines(&body);

    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[1],
        format!("# {}", ContentHash::of(b"Testbody { color: red; }yay"))
    );
    assert_eq!(&lines[2..5], &["/static/static1.js", "/static/static2.css", "/"]);
}

#[tokio::test]
async fn test_finalized_manifest_ignores_content_changes() {
    let flipped = Arc::new(AtomicBool::new(false));
    let site = Router::new()
        .route(
            "/",
            get(|State(flipped): State<Arc<AtomicBool>>| async move {
                if flipped.load(Ordering::SeqCst) {
                    "changed"
                } else {
                    "yay"
                }
            }),
        )
        .with_state(Arc::clone(&flipped));

    let appcache = Appcache::for_router(AppcacheConfig::default(), site.clone()).unwrap();
    appcache.add_urls(["/"]).await.unwrap();
    appcache.finalize().await.unwrap();
    let app = appcache.init_app(site);

    let before = body_string(get_response(&app, "/manifest.appcache").await).await;
    flipped.store(true, Ordering::SeqCst);
    let after = body_string(get_response(&app, "/manifest.appcache").await).await;
    assert_eq!(before, after);
}
