#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use lettings_core::availability::AvailabilityRules;
use lettings_core::clock::FixedClock;
use lettings_core::types::LocalInstant;
use sqlx::PgPool;
use tower::ServiceExt;

use lettings_api::config::ServerConfig;
use lettings_api::router::build_app_router;
use lettings_api::state::AppState;

/// Monday 2024-06-03 10:00, the instant every test app treats as "now".
pub fn test_now() -> LocalInstant {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Viewing rules are the defaults: 09:00-17:00, hourly slots, 30 days ahead,
/// 24 hours notice, weekends excluded.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        viewing_rules: AvailabilityRules::default(),
    }
}

/// Build the full application router, pinned to [`test_now`].
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock: Arc::new(FixedClock(test_now())),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
