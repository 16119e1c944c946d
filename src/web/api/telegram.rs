//! Telegram webhook receiver.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use teloxide::types::Update;

use crate::telegram::gateway;

use super::super::AppState;

/// Accept one webhook update. Always acknowledges with a success body,
/// including for denied senders and internal errors, so the provider never
/// retries a message that was intentionally rejected.
pub async fn webhook(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    match serde_json::from_value::<Update>(body) {
        Ok(update) => {
            gateway::handle_update(&state.store, &state.sender, update).await;
        }
        Err(e) => {
            tracing::debug!("Ignoring undecodable Telegram update: {}", e);
        }
    }
    Json(json!({ "ok": true }))
}
