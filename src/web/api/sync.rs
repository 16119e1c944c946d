//! Manual external-source sync.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::super::auth::AuthUser;
use super::super::AppState;
use super::{error_response, internal_error, ErrorBody};

/// Pull the external lead list and insert names not already present.
/// Returns the number of newly inserted leads.
pub async fn run(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let incoming = state.sheets.master_leads().await.map_err(|e| {
        tracing::error!("Sync failed: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Sync failed")
    })?;

    let count = state
        .store
        .sync_from_source(&auth.user_id, &incoming)
        .map_err(internal_error)?;

    Ok(Json(json!({ "success": true, "count": count })))
}
