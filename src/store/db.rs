//! Store bootstrap and schema.

use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS leads (
    id TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL,
    client_name TEXT NOT NULL,
    project_type TEXT NOT NULL,
    heat_level TEXT NOT NULL,
    status TEXT NOT NULL,
    project_value INTEGER NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT '',
    last_synced_at INTEGER,
    user_id TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS project_details (
    lead_id TEXT PRIMARY KEY,
    chat_logs TEXT NOT NULL DEFAULT '',
    milestones TEXT NOT NULL DEFAULT '[]',
    user_id TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS project_analysis (
    lead_id TEXT PRIMARY KEY,
    technical_summary TEXT,
    proposal_content TEXT,
    last_updated INTEGER NOT NULL,
    user_id TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS copilot_memory (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    channel TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS telegram_users (
    chat_id INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_leads_user ON leads(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_memory_user ON copilot_memory(user_id, created_at);
"#;

/// Handle to the CRM database. Cheap to clone; a connection is opened per
/// operation so the handle stays Send + Sync for axum state.
#[derive(Clone, Debug)]
pub struct Store {
    db_path: PathBuf,
}

impl Store {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            db_path: path.as_ref().to_path_buf(),
        };
        if let Some(parent) = store.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = store.conn()?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::Db(format!("schema init: {}", e)))?;
        Ok(store)
    }

    pub(crate) fn conn(&self) -> Result<Connection> {
        Connection::open(&self.db_path).map_err(|e| Error::Db(format!("sqlite open: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Store;

    /// Fresh store in a temp directory. The directory guard must be kept
    /// alive for the duration of the test.
    pub(crate) fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("test.db")).expect("open store");
        (dir, store)
    }
}
