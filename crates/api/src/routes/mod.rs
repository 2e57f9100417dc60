//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qbsync_shared::AppError;
use serde::Serialize;
use serde_json::json;

use crate::AppState;

pub mod health;
pub mod sync;

/// Creates the versioned API router.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(sync::routes())
}

/// Success envelope.
pub(crate) fn envelope<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (status, Json(json!({ "message": message, "data": data }))).into_response()
}

/// Error envelope carrying the error code and the message.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.message(),
            "data": {}
        })),
    )
        .into_response()
}
