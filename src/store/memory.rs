//! Append-only per-user conversation memory.

use rusqlite::params;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Channel, MemoryMessage, Role};

use super::Store;

impl Store {
    /// Append one chat turn. Blank content is dropped silently.
    pub fn append_memory(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
        channel: Channel,
    ) -> Result<()> {
        if content.trim().is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO copilot_memory (id, user_id, role, content, channel, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                user_id,
                role.to_string(),
                content,
                channel.to_string(),
                chrono::Utc::now().timestamp_millis(),
            ],
        )
        .map_err(|e| Error::Db(format!("insert memory: {}", e)))?;
        Ok(())
    }

    /// Most recent `limit` turns, returned in chronological order.
    pub fn recent_memory(&self, user_id: &str, limit: usize) -> Result<Vec<MemoryMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT role, content, channel, created_at FROM copilot_memory \
                 WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            )
            .map_err(|e| Error::Db(format!("prepare recent memory: {}", e)))?;
        let mut messages = stmt
            .query_map(params![user_id, limit as i64], |row| {
                let role: String = row.get(0)?;
                let channel: String = row.get(2)?;
                Ok(MemoryMessage {
                    role: Role::parse_lossy(&role),
                    content: row.get(1)?,
                    channel: Channel::parse_lossy(&channel),
                    created_at: row.get(3)?,
                })
            })
            .map_err(|e| Error::Db(format!("query memory: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Db(format!("read memory row: {}", e)))?;
        messages.reverse();
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::super::db::test_support::temp_store;
    use super::*;

    #[test]
    fn memory_reads_back_in_chronological_order() {
        let (_dir, store) = temp_store();
        for i in 0..5 {
            store
                .append_memory("u1", Role::User, &format!("msg {}", i), Channel::Web)
                .unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let recent = store.recent_memory("u1", 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "msg 2");
        assert_eq!(recent[2].content, "msg 4");
    }

    #[test]
    fn blank_turns_are_dropped() {
        let (_dir, store) = temp_store();
        store.append_memory("u1", Role::Assistant, "  ", Channel::Web).unwrap();
        assert!(store.recent_memory("u1", 10).unwrap().is_empty());
    }

    #[test]
    fn memory_is_scoped_per_user() {
        let (_dir, store) = temp_store();
        store.append_memory("u1", Role::User, "mine", Channel::Telegram).unwrap();
        assert!(store.recent_memory("u2", 10).unwrap().is_empty());
    }
}
