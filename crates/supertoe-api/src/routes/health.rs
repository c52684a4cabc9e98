//! Liveness endpoints.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// GET /
async fn banner() -> &'static str {
    "Super Tic-Tac-Toe Server is running!"
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Returns the liveness router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
}
