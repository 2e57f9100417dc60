//! Synchronization routes.
//!
//! Per-document outcomes, failures included, are returned in the body with
//! `201 Created`. Only errors that stop the whole request map to an error
//! status.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::Response,
    routing::post,
};
use qbsync_core::document::{Bill, Invoice, Submission};
use qbsync_shared::AppError;
use qbsync_shared::types::TenantCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use super::{envelope, error_response};
use crate::AppState;

/// Creates the synchronization routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/connect", post(connect))
        .route("/invoices", post(sync_invoices))
        .route("/bills", post(sync_bill))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for `/connect`.
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Tenant to bootstrap.
    pub tenant: TenantCode,
}

/// Request body for `/invoices`.
#[derive(Debug, Deserialize)]
pub struct InvoiceBatchRequest {
    /// Tenant the invoices belong to.
    pub tenant: TenantCode,
    /// Raw invoices; each one is parsed on its own.
    #[serde(default)]
    pub invoices: Vec<Value>,
}

/// Request body for `/bills`.
#[derive(Debug, Deserialize)]
pub struct BillRequest {
    /// Tenant the bill belongs to.
    pub tenant: TenantCode,
    /// Raw bill.
    pub bill: Value,
}

fn require_tenant(tenant: &TenantCode) -> Result<(), AppError> {
    if tenant.is_blank() {
        return Err(AppError::Validation("tenant is required".into()));
    }
    Ok(())
}

fn failed(tenant: &TenantCode, action: &str, err: AppError) -> Response {
    error!(tenant = %tenant, error = %err, "{action} failed");
    error_response(&err)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/connect` - Ensure the reference data exists in the company file.
async fn connect(State(state): State<AppState>, Json(body): Json<ConnectRequest>) -> Response {
    if let Err(e) = require_tenant(&body.tenant) {
        return error_response(&e);
    }
    match state.engine.connect(&body.tenant).await {
        Ok(report) => {
            info!(tenant = %body.tenant, created = report.created.len(), "company file connected");
            envelope(
                StatusCode::OK,
                "Connected",
                json!({ "tenant": body.tenant, "created": report.created }),
            )
        }
        Err(e) => failed(&body.tenant, "connect", e.into()),
    }
}

/// POST `/invoices` - Create or replace a batch of invoices.
async fn sync_invoices(
    State(state): State<AppState>,
    Json(body): Json<InvoiceBatchRequest>,
) -> Response {
    if let Err(e) = require_tenant(&body.tenant) {
        return error_response(&e);
    }
    if body.invoices.is_empty() {
        return error_response(&AppError::Validation("invoices must not be empty".into()));
    }
    let submissions = body
        .invoices
        .into_iter()
        .map(Submission::<Invoice>::from_value)
        .collect();
    match state.engine.sync_invoices(&body.tenant, submissions).await {
        Ok(outcome) => envelope(StatusCode::CREATED, "Invoices processed", outcome),
        Err(e) => failed(&body.tenant, "invoice batch", e.into()),
    }
}

/// POST `/bills` - Create or replace one bill.
async fn sync_bill(State(state): State<AppState>, Json(body): Json<BillRequest>) -> Response {
    if let Err(e) = require_tenant(&body.tenant) {
        return error_response(&e);
    }
    let submission = Submission::<Bill>::from_value(body.bill);
    match state.engine.sync_bills(&body.tenant, vec![submission]).await {
        Ok(outcome) => envelope(StatusCode::CREATED, "Bill processed", outcome),
        Err(e) => failed(&body.tenant, "bill", e.into()),
    }
}
