#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use commerce_db::services::OrderStatusService;
use commerce_events::StatusChangeNotifier;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use commerce_api::config::ServerConfig;
use commerce_api::router::build_app_router;
use commerce_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
    }
}

/// Build the full application router over `pool` without notifications.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, |_| None)
}

/// Build the full application router, letting the caller wire a notifier
/// onto the shared order status service.
pub fn build_test_app_with(
    pool: PgPool,
    notifier: impl FnOnce(Arc<OrderStatusService>) -> Option<StatusChangeNotifier>,
) -> Router {
    let config = test_config();
    let order_statuses = Arc::new(OrderStatusService::new(pool.clone()));
    let notifier = notifier(Arc::clone(&order_statuses)).map(Arc::new);

    let state = AppState {
        pool,
        order_statuses,
        notifier,
    };

    build_app_router(state, &config)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
