//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The health probe
//! - Connect, invoice batch and bill routes over the sync engine
//! - The `{message, data}` response envelope and error mapping

pub mod routes;

use std::sync::Arc;

use axum::Router;
use qbsync_core::SyncEngine;
use qbsync_db::LedgerRepository;
use qbsync_gateway::HttpRequestProcessor;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Engine wired to the bridge adapter and the durable ledger.
pub type Engine = SyncEngine<HttpRequestProcessor, LedgerRepository>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Synchronization engine.
    pub engine: Arc<Engine>,
}

impl AppState {
    /// Wraps an engine for sharing across handlers.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
