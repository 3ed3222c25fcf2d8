#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use lus_core::library::VideoLibrary;
use sqlx::SqlitePool;
use tower::ServiceExt;

use lus_api::config::ServerConfig;
use lus_api::router::build_app_router;
use lus_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(video_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        video_root,
        password_min_length: 1,
    }
}

/// Build the full application router over an empty video library.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with_library(pool, Path::new("/nonexistent/lus-video-root"))
}

/// Build the full application router serving videos from `root`.
///
/// Uses [`build_app_router`] so tests exercise the production middleware stack.
pub fn build_test_app_with_library(pool: SqlitePool, root: &Path) -> Router {
    let config = test_config(root.to_path_buf());
    let state = AppState {
        pool,
        library: Arc::new(VideoLibrary::new(root)),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Write a small fake video file, creating parent folders.
pub fn write_video(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_with_header(app: Router, uri: &str, name: &str, value: &str) -> Response<Body> {
    app.oneshot(
        Request::get(uri)
            .header(name, value)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send_json(app, "POST", uri, json).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::delete(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn delete_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send_json(app, "DELETE", uri, json).await
}

async fn send_json(app: Router, method: &str, uri: &str, json: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Register a user through the API.
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/users",
        serde_json::json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}
