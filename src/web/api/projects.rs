//! Project intelligence endpoints: proposal drafting, note summarization,
//! next-step advice, and the analysis archive.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::copilot::provider::ChatMessage;
use crate::model::{Milestone, ProjectAnalysis, ProjectDetails};
use crate::store::{AnalysisUpdate, ProjectDetailsUpdate};

use super::super::auth::AuthUser;
use super::super::AppState;
use super::{error_response, internal_error, ErrorBody};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize)]
pub struct ProposalResponse {
    pub proposal: String,
}

fn standalone_proposal_prompt(request: &ProposalRequest) -> String {
    format!(
        "ACT AS: Senior Technical Architect & Strategy Consultant.\n\
         CONTEXT: You are drafting an executive proposal for {client}.\n\
         PROJECT: {project}\n\
         VALUE: {value} OMR\n\
         NOTES: {notes}\n\n\
         OBJECTIVE: Write a persuasive, executive-level proposal. Be authoritative, \
         innovative, and commercial; avoid generic or academic language.\n\n\
         REQUIRED STRUCTURE:\n\
         ### EXECUTIVE SUMMARY\n\
         (Business impact first.)\n\n\
         ### STRATEGIC TECHNICAL ARCHITECTURE\n\
         (Infrastructure, performance, security.)\n\n\
         ### INVESTMENT & SCALABILITY PHASE\n\
         (Frame the {value} OMR investment as a growth engine.)\n\n\
         ### IMMEDIATE ACTION PLAN\n\
         (Clear next steps.)\n\n\
         FORMAT: Plain text, bullet points, concise (under 400 words).",
        client = request.client_name,
        project = request.project_type,
        value = request.value,
        notes = request.notes,
    )
}

/// Draft a standalone proposal. Provider failures degrade to an error string
/// in the proposal field so the caller's panel can render it.
pub async fn draft_proposal(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(request): Json<ProposalRequest>,
) -> Json<ProposalResponse> {
    let messages = vec![
        ChatMessage::system(
            "You are an elite digital strategist. Output clean plain text suitable for a \
             terminal window. Use direct, high-performance business language.",
        ),
        ChatMessage::user(standalone_proposal_prompt(&request)),
    ];

    let proposal = match state.provider.chat(messages).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Proposal generation failed: {}", e);
            format!("Error: proposal generation failed ({})", e)
        }
    };

    Json(ProposalResponse { proposal })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    #[serde(default)]
    pub chat_log: String,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub summary: Vec<String>,
}

/// Condense a chat log into the fixed three-line brief.
pub async fn summarize(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.chat_log.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Chat log is required"));
    }

    let messages = vec![
        ChatMessage::system(
            "You are a senior systems architect. Analyze the following project notes/chat log. \
             Output exactly 3 lines in this format:\n\n\
             EXECUTIVE SUMMARY: (Max 2 sentences)\n\
             TECHNICAL REQUIREMENTS: (Comma separated list)\n\
             NEXT HIGH-ROI STEP: (One clear action)",
        ),
        ChatMessage::user(request.chat_log),
    ];

    let content = state.provider.chat(messages).await.map_err(|e| {
        tracing::error!("Summary generation failed: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate summary")
    })?;

    let summary = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect();

    Ok(Json(SummarizeResponse { summary }))
}

#[derive(Deserialize)]
pub struct NextStepRequest {
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize)]
pub struct NextStepResponse {
    pub advice: String,
}

/// Recommend the next action for a lead from its notes.
pub async fn next_step(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(request): Json<NextStepRequest>,
) -> Result<Json<NextStepResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.notes.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Notes are required"));
    }

    let messages = vec![
        ChatMessage::system(
            "You are a sales closer for a technical agency. Given lead notes, recommend the \
             single highest-ROI next step in 3 short numbered points: immediate action, \
             strategy, closing move.",
        ),
        ChatMessage::user(request.notes),
    ];

    let advice = state.provider.chat(messages).await.map_err(|e| {
        tracing::error!("Next-step generation failed: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate advice")
    })?;

    Ok(Json(NextStepResponse { advice }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    pub project_id: Uuid,
    pub proposal_content: Option<String>,
    pub technical_summary: Option<String>,
}

/// Upsert the permanent analysis archive for a lead.
pub async fn archive(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ArchiveRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    state
        .store
        .save_project_analysis(
            &auth.user_id,
            request.project_id,
            AnalysisUpdate {
                technical_summary: request.technical_summary,
                proposal_content: request.proposal_content,
            },
        )
        .map_err(internal_error)?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Serialize)]
pub struct ProjectBundle {
    pub details: Option<ProjectDetails>,
    pub analysis: Option<ProjectAnalysis>,
}

/// Details + analysis bundle for one lead.
pub async fn get_bundle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectBundle>, (StatusCode, Json<ErrorBody>)> {
    if state
        .store
        .get_lead(&auth.user_id, id)
        .map_err(internal_error)?
        .is_none()
    {
        return Err(error_response(StatusCode::NOT_FOUND, "Lead not found"));
    }

    let details = state
        .store
        .get_project_details(&auth.user_id, id)
        .map_err(internal_error)?;
    let analysis = state
        .store
        .get_project_analysis(&auth.user_id, id)
        .map_err(internal_error)?;

    Ok(Json(ProjectBundle { details, analysis }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDetailsRequest {
    pub chat_logs: Option<String>,
    pub milestones: Option<Vec<Milestone>>,
}

/// Save chat logs / milestones, creating the row lazily.
pub async fn save_details(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveDetailsRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    state
        .store
        .save_project_details(
            &auth.user_id,
            id,
            ProjectDetailsUpdate {
                chat_logs: request.chat_logs,
                milestones: request.milestones,
            },
        )
        .map_err(internal_error)?;

    Ok(Json(json!({ "success": true })))
}
