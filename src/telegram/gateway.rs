//! Webhook command gateway: chat-id authorization and the fixed command set.

use teloxide::types::{Update, UpdateKind};

use crate::model::{HeatLevel, PipelineStatus};
use crate::store::Store;

use super::sender::TelegramSender;

const ACCESS_DENIED: &str =
    "🚫 *Access Denied*\n\nYour Telegram account is not linked to Leadpilot.";

const HELP_TEXT: &str = "👋 *Leadpilot Online*\n\nI am connected to your CRM. Commands:\n\n\
                         • /leads - View Hot/Active leads\n\
                         • /move [client] [status] - Update pipeline\n\
                         • /analyze [client] - AI Strategic Analysis";

/// Handle one inbound update. Authorization is checked inline; command
/// processing is detached so the webhook acknowledgement is never delayed by
/// a heavy command.
pub async fn handle_update(store: &Store, sender: &TelegramSender, update: Update) {
    let UpdateKind::Message(message) = update.kind else {
        return;
    };
    let Some(text) = message.text() else {
        return;
    };
    let chat_id = message.chat.id.0;

    let user_id = match store.telegram_user(chat_id) {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            tracing::warn!("Unauthorized Telegram access attempt from chat id {}", chat_id);
            sender.send(chat_id, ACCESS_DENIED).await;
            return;
        }
        Err(e) => {
            tracing::error!("Telegram identity lookup failed: {}", e);
            sender.send(chat_id, ACCESS_DENIED).await;
            return;
        }
    };

    let username = message
        .from
        .as_ref()
        .and_then(|u| u.username.clone())
        .unwrap_or_default();
    tracing::info!("Telegram command from @{} (chat {}): {}", username, chat_id, text);

    let store = store.clone();
    let sender = sender.clone();
    let text = text.to_string();
    tokio::spawn(async move {
        if let Some(reply) = build_reply(&store, &user_id, &text) {
            sender.send(chat_id, &reply).await;
        }
    });
}

/// Resolve a command to its reply text, performing any writes as a side
/// effect. Unrecognized input resolves to no reply at all.
pub(crate) fn build_reply(store: &Store, user_id: &str, text: &str) -> Option<String> {
    if text.starts_with("/start") {
        Some(HELP_TEXT.to_string())
    } else if text.starts_with("/leads") {
        Some(cmd_leads(store, user_id))
    } else if text.starts_with("/move") {
        Some(cmd_move(store, user_id, text))
    } else if text.starts_with("/analyze") {
        Some("🧠 *Thinking...* Analysis triggered.".to_string())
    } else {
        None
    }
}

fn cmd_leads(store: &Store, user_id: &str) -> String {
    let leads = match store.list_leads(user_id) {
        Ok(leads) => leads,
        Err(e) => {
            tracing::error!("Failed to list leads: {}", e);
            return "❌ Database Error.".to_string();
        }
    };

    if leads.is_empty() {
        return "📭 Your pipeline is empty.".to_string();
    }

    let priority: Vec<_> = leads
        .iter()
        .filter(|l| l.heat_level == HeatLevel::Hot || l.status == PipelineStatus::Working)
        .collect();

    if priority.is_empty() {
        return "📭 No priority leads found (Hot/Working).".to_string();
    }

    let mut msg = String::from("🔥 *Priority Pipeline*\n\n");
    for lead in priority {
        msg.push_str(&format!(
            "• *{}* ({})\n   Status: {} | Value: OMR {}\n\n",
            lead.client_name, lead.project_type, lead.status, lead.value
        ));
    }
    msg
}

fn cmd_move(store: &Store, user_id: &str, text: &str) -> String {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 3 {
        return "⚠️ Usage: `/move [Client Name] [Status]`\nExample: `/move Lava Done`".to_string();
    }

    let client_query = parts[1].to_lowercase();
    let status_query = parts[2];

    let lead = match store.find_lead_by_name(user_id, &client_query) {
        Ok(Some(lead)) => lead,
        Ok(None) => return format!("❌ Client matching \"{}\" not found.", client_query),
        Err(e) => {
            tracing::error!("Lead lookup failed: {}", e);
            return "❌ Database Error.".to_string();
        }
    };

    // Case-insensitive mapping to a known stage; unmatched tokens write
    // through unchanged.
    match store.update_lead_status(user_id, lead.id, status_query) {
        Ok(stored) => format!("✅ *{}* moved to *{}*.", lead.client_name, stored),
        Err(e) => {
            tracing::error!("Status update failed: {}", e);
            "❌ Database Error.".to_string()
        }
    }
}
