//! Detached conversation-memory persistence.
//!
//! Chat turns are enqueued to a bounded queue and written by a background
//! task, so a slow or failing write never delays the user-visible reply.
//! Enqueue failure is logged and the turn dropped (at-most-once, best
//! effort).

use tokio::sync::mpsc;

use crate::model::{Channel, Role};
use crate::store::Store;

const QUEUE_CAPACITY: usize = 256;

/// One chat turn awaiting persistence.
#[derive(Clone, Debug)]
pub struct MemoryTurn {
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub channel: Channel,
}

/// Handle to the background memory writer.
#[derive(Clone)]
pub struct MemoryWriter {
    tx: mpsc::Sender<MemoryTurn>,
}

impl MemoryWriter {
    /// Spawn the writer task and return its handle.
    pub fn spawn(store: Store) -> Self {
        let (tx, mut rx) = mpsc::channel::<MemoryTurn>(QUEUE_CAPACITY);
        tokio::spawn(async move {
            while let Some(turn) = rx.recv().await {
                if let Err(e) =
                    store.append_memory(&turn.user_id, turn.role, &turn.content, turn.channel)
                {
                    tracing::warn!("Memory write failed: {}", e);
                }
            }
        });
        Self { tx }
    }

    /// Enqueue a turn without waiting for the write.
    pub fn record(&self, turn: MemoryTurn) {
        if self.tx.try_send(turn).is_err() {
            tracing::warn!("Memory queue full or closed, dropping turn");
        }
    }

    /// Convenience for recording a user/assistant exchange.
    pub fn record_exchange(&self, user_id: &str, channel: Channel, command: &str, reply: &str) {
        self.record(MemoryTurn {
            user_id: user_id.to_string(),
            role: Role::User,
            content: command.to_string(),
            channel,
        });
        self.record(MemoryTurn {
            user_id: user_id.to_string(),
            role: Role::Assistant,
            content: reply.to_string(),
            channel,
        });
    }
}
