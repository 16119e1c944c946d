//! Lead listing, intake, and updates.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::model::{Lead, LeadUpdate, NewLead};

use super::super::auth::AuthUser;
use super::super::AppState;
use super::{error_response, internal_error, ErrorBody};

#[derive(Deserialize)]
pub struct ListQuery {
    /// `incoming` selects the external website-form source instead of the
    /// primary store.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// List leads, or incoming rows from the external source.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    if query.kind.as_deref() == Some("incoming") {
        let incoming = state.sheets.incoming_leads().await;
        return Ok(Json(json!(incoming)));
    }

    let leads = state
        .store
        .list_leads(&auth.user_id)
        .map_err(internal_error)?;
    Ok(Json(json!(leads)))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub project_type: String,
    pub heat_level: Option<crate::model::HeatLevel>,
    pub status: Option<crate::model::PipelineStatus>,
    pub notes: Option<String>,
    pub value: Option<i64>,
}

#[derive(Serialize)]
pub struct CreateLeadResponse {
    pub success: bool,
    pub lead: Lead,
}

/// Create a lead owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateLeadRequest>,
) -> Result<Json<CreateLeadResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.client_name.trim().is_empty() || request.project_type.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields",
        ));
    }

    let lead = state
        .store
        .create_lead(
            &auth.user_id,
            NewLead {
                client_name: request.client_name,
                project_type: request.project_type,
                heat_level: request.heat_level.unwrap_or_default(),
                status: request.status.unwrap_or_default(),
                notes: request.notes.unwrap_or_default(),
                value: request.value.unwrap_or(0),
            },
        )
        .map_err(internal_error)?;

    Ok(Json(CreateLeadResponse {
        success: true,
        lead,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub updates: LeadUpdate,
}

/// Apply a partial update to a lead.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateLeadRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    if request.updates.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Missing id or updates",
        ));
    }

    let found = state
        .store
        .update_lead(&auth.user_id, request.id, request.updates)
        .map_err(internal_error)?;

    if !found {
        return Err(error_response(StatusCode::NOT_FOUND, "Lead not found"));
    }

    Ok(Json(json!({ "success": true })))
}
