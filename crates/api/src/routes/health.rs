//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Tenants with a configured company file, sorted.
    pub tenants: Vec<String>,
}

/// Health check handler. Does not contact the request-processor bridge.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut tenants: Vec<String> = state
        .engine
        .quickbooks()
        .companies
        .keys()
        .cloned()
        .collect();
    tenants.sort();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tenants,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
