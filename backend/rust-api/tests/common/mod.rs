#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use mathworlds_api::{
    config::Config,
    create_router,
    services::{progress_storage::MemoryStorage, AppState},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn test_config() -> Config {
    Config {
        rng_seed: Some(2024),
        advisor_timeout_ms: 1000,
        ..Config::default()
    }
}

/// Rules-only app over in-memory progress.
pub fn create_test_app() -> Router {
    init_tracing();
    let state = AppState::with_storage(test_config(), Arc::new(MemoryStorage::new()), None);
    create_router(Arc::new(state))
}

/// App persisting progress under `dir`, optionally wired to a collaborator.
pub fn create_file_backed_app(dir: &TempDir, advisor_url: Option<String>) -> Router {
    init_tracing();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        advisor_url,
        ..test_config()
    };
    let state = AppState::new(config).expect("Failed to initialize test app state");
    create_router(Arc::new(state))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}
