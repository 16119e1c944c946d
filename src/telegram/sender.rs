//! Outbound Telegram send primitive.

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::config::Settings;

/// Single send path for all gateway replies. A missing bot token turns every
/// send into a logged no-op instead of an error.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Option<Bot>,
}

impl TelegramSender {
    pub fn from_settings(settings: &Settings) -> Self {
        match &settings.channels.telegram.bot_token {
            Some(token) => Self {
                bot: Some(Bot::new(token.clone())),
            },
            None => {
                tracing::warn!("No Telegram bot token configured, replies disabled");
                Self { bot: None }
            }
        }
    }

    pub fn disabled() -> Self {
        Self { bot: None }
    }

    /// Send a Markdown-formatted message. Failures are logged, never raised;
    /// a swallowed send is the only way a background command failure can go
    /// completely silent.
    pub async fn send(&self, chat_id: i64, text: &str) {
        let Some(bot) = &self.bot else {
            tracing::debug!("Telegram send skipped (no bot token)");
            return;
        };
        if let Err(e) = bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Markdown)
            .await
        {
            tracing::warn!("Failed to send Telegram message: {}", e);
        }
    }
}
