//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use farmops_api::auth::jwt::{generate_access_token, JwtConfig};
use farmops_api::auth::password::hash_password;
use farmops_api::config::{OperationLogConfig, ServerConfig};
use farmops_api::router::build_app_router;
use farmops_api::state::AppState;
use farmops_core::roles::ROLE_SUPER_ADMIN;
use farmops_db::models::user::CreateUser;
use farmops_db::repositories::UserRepo;

pub const TEST_PASSWORD: &str = "harvest-2024";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        max_body_bytes: 64 * 1024,
        default_reset_password: "123456".to_string(),
        operation_log: OperationLogConfig {
            enabled: true,
            max_capture: 2048,
        },
        bootstrap_admin: None,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router (all middleware layers) on `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Like [`build_test_app`] with a caller-adjusted configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_app_router(AppState {
        pool,
        config: Arc::new(config),
    })
}

/// Router backed by a pool that never connects, with the operation log off.
///
/// Only usable for requests that are rejected before any query runs.
pub fn build_offline_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://offline@localhost:1/offline")
        .expect("lazy pool should build");
    let mut config = test_config();
    config.operation_log.enabled = false;
    build_app_router(AppState {
        pool,
        config: Arc::new(config),
    })
}

/// Sign a token for an arbitrary identity without touching the database.
pub fn token_for(user_id: i64, username: &str, roles: &[&str]) -> String {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    generate_access_token(user_id, username, &roles, &test_config().jwt)
        .expect("token generation should succeed")
}

/// Insert a user with `roles` and return `(user_id, access_token)`.
pub async fn create_user_with_token(pool: &PgPool, username: &str, roles: &[&str]) -> (i64, String) {
    let input = CreateUser {
        username: username.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        real_name: format!("{username} (test)"),
        phone: Some("13800000000".to_string()),
        department: None,
    };
    let roles_owned: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    let user = UserRepo::create(pool, &input, &roles_owned)
        .await
        .expect("user creation should succeed");
    (user.id, token_for(user.id, username, roles))
}

/// Insert a super-admin and return its access token.
pub async fn admin_token(pool: &PgPool) -> String {
    create_user_with_token(pool, "root", &[ROLE_SUPER_ADMIN]).await.1
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::DELETE, uri, Some(body), Some(token)).await
}

/// Read the full response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read the full response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
