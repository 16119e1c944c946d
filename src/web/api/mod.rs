//! API endpoint handlers.

pub mod copilot;
pub mod leads;
pub mod projects;
pub mod sync;
pub mod telegram;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Uniform error body: `{"error": "..."}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub(crate) fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

pub(crate) fn internal_error(e: crate::error::Error) -> (StatusCode, Json<ErrorBody>) {
    tracing::error!("Request failed: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
