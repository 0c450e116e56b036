//! Shared helpers for the API integration tests.
//!
//! The application is built over the in-memory repository, so these tests
//! need no database. Postgres-backed behaviour is covered separately in
//! `crates/db/tests/inventory_pg.rs`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use stockroom_api::auth::jwt::{generate_access_token, JwtConfig};
use stockroom_api::config::{AlertConfig, ServerConfig};
use stockroom_api::router::build_app_router;
use stockroom_api::state::AppState;
use stockroom_db::{InMemoryInventoryRepository, StoreConfig};
use stockroom_notify::{AlertChannel, LogChannel, LowStockNotifier};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        database_max_connections: 1,
        jwt: JwtConfig::new(TEST_SECRET),
        inventory: StoreConfig::default(),
        alerts: AlertConfig::default(),
    }
}

/// Application under test plus a handle on its storage.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryInventoryRepository>,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(
        test_config(),
        InMemoryInventoryRepository::new(),
        vec![Arc::new(LogChannel)],
    )
}

pub fn build_test_app_with(
    config: ServerConfig,
    repo: InMemoryInventoryRepository,
    channels: Vec<Arc<dyn AlertChannel>>,
) -> TestApp {
    let repo = Arc::new(repo);
    let state = AppState::new(config, repo.clone(), LowStockNotifier::new(channels));
    TestApp {
        router: build_app_router(state),
        repo,
    }
}

/// Signed bearer token for the given role and permissions.
pub fn token(role: &str, permissions: &[&str]) -> String {
    generate_access_token("test-user", role, permissions, &JwtConfig::new(TEST_SECRET))
        .expect("token generation should succeed")
}

pub fn admin_token() -> String {
    token("admin", &[])
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, Some(token), body).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, Some(token), body).await
}

/// Create a record through the API and return its JSON.
pub async fn create_item(
    app: &Router,
    sku: &str,
    location: &str,
    stock: i32,
    threshold: i32,
) -> Value {
    let body = serde_json::json!({
        "productId": uuid::Uuid::new_v4(),
        "sku": sku,
        "stock": stock,
        "location": location,
        "threshold": threshold,
    });
    let response = post_json_auth(app, "/api/v1/inventory", &admin_token(), body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
