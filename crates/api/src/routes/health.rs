use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Counter store backend: `redis`, `memory` or `disabled`.
    pub rate_limit_store: &'static str,
}

/// GET /health -- returns service and counter store health.
///
/// An unreachable store only degrades the status; the relay keeps
/// accepting submissions with rate limiting failing open.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = state.rate_limiter.is_healthy().await;

    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        rate_limit_store: state.rate_limiter.backend(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
