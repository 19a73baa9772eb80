#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sentinelle_api::config::ServerConfig;
use sentinelle_api::extract::ACTOR_HEADER;
use sentinelle_api::routes;
use sentinelle_api::state::AppState;
use sentinelle_core::dashboard::DashboardSettings;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        dashboard: DashboardSettings::default(),
    }
}

/// Build the application router with the production middleware stack,
/// minus CORS.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// POST a JSON body as the given actor.
pub async fn post_json(app: Router, uri: &str, actor: i64, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(ACTOR_HEADER, actor.to_string())
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn insert_client(pool: &PgPool) -> i64 {
    sqlx::query_scalar("INSERT INTO clients (name) VALUES ('Bakery') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Active monthly contract running 2024-01-15 to 2024-06-30.
pub async fn insert_monthly_contract(pool: &PgPool, client_id: i64, auto_create_next: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO contracts \
            (client_id, kind_id, status_id, start_date, end_date, regular_frequency, auto_create_next) \
         VALUES ($1, 1, 2, '2024-01-15', '2024-06-30', 'monthly', $2) \
         RETURNING id",
    )
    .bind(client_id)
    .bind(auto_create_next)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Queued regular visit of a contract's site-less series.
pub async fn insert_visit(pool: &PgPool, contract_id: i64, client_id: i64, planned: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO interventions (contract_id, client_id, kind_id, status_id, planned_date) \
         VALUES ($1, $2, 1, 1, $3::DATE) \
         RETURNING id",
    )
    .bind(contract_id)
    .bind(client_id)
    .bind(planned)
    .fetch_one(pool)
    .await
    .unwrap()
}
