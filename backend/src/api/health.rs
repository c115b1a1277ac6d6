use crate::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match &state.database {
        None => (StatusCode::OK, "memory"),
        Some(db) => match db.ping().await {
            Ok(()) => (StatusCode::OK, "up"),
            Err(e) => {
                warn!("Health check failed: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "down")
            }
        },
    };

    let body = HealthResponse {
        status: if status == StatusCode::OK { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    };

    (
        status,
        [(header::CACHE_CONTROL, "no-store")],
        Json(body),
    )
}
