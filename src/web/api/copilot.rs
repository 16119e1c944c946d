//! Copilot chat endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::copilot::interpreter;
use crate::model::Channel;

use super::super::auth::AuthUser;
use super::super::AppState;
use super::{error_response, internal_error, ErrorBody};

#[derive(Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: String,
}

#[derive(Serialize)]
pub struct CommandResponse {
    pub reply: String,
}

/// Run one free-text command through the interpreter.
pub async fn run_command(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.command.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "No command provided"));
    }

    let reply = interpreter::run_command(
        &state.store,
        state.provider.as_ref(),
        &state.memory,
        &auth.user_id,
        Channel::Web,
        &request.command,
    )
    .await
    .map_err(internal_error)?;

    Ok(Json(CommandResponse { reply }))
}
