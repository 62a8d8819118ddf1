//! Integration tests for manifest versioning
//!
//! These tests drive the versioner through a real `axum::Router`, so content
//! is fetched the same way the manifest route fetches it.
