//! Telegram chat-id to user-id identity mapping.

use rusqlite::{params, OptionalExtension};

use crate::error::{Error, Result};

use super::Store;

impl Store {
    /// Resolve a Telegram chat id to an internal user id.
    pub fn telegram_user(&self, chat_id: i64) -> Result<Option<String>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT user_id FROM telegram_users WHERE chat_id = ?1",
            params![chat_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::Db(format!("telegram user lookup: {}", e)))
    }

    /// Bind a chat id to a user id, replacing any previous binding.
    pub fn link_telegram_user(&self, chat_id: i64, user_id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO telegram_users (chat_id, user_id) VALUES (?1, ?2) \
             ON CONFLICT(chat_id) DO UPDATE SET user_id = ?2",
            params![chat_id, user_id],
        )
        .map_err(|e| Error::Db(format!("link telegram user: {}", e)))?;
        Ok(())
    }
}
