//! Lead CRUD, fuzzy lookup, and external-source sync.

use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{HeatLevel, Lead, LeadUpdate, NewLead, PipelineStatus, SourceLead};

use super::Store;

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let heat: String = row.get(4)?;
    let status: String = row.get(5)?;
    Ok(Lead {
        id,
        created_at: row.get(1)?,
        client_name: row.get(2)?,
        project_type: row.get(3)?,
        heat_level: HeatLevel::parse_lossy(&heat),
        status: PipelineStatus::parse_lossy(&status),
        value: row.get(6)?,
        notes: row.get(7)?,
        last_synced_at: row.get(8)?,
        user_id: row.get(9)?,
    })
}

const LEAD_COLUMNS: &str = "id, created_at, client_name, project_type, heat_level, status, \
                            project_value, notes, last_synced_at, user_id";

impl Store {
    /// List the caller's leads, most recently created first.
    pub fn list_leads(&self, user_id: &str) -> Result<Vec<Lead>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM leads WHERE user_id = ?1 ORDER BY created_at DESC",
                LEAD_COLUMNS
            ))
            .map_err(|e| Error::Db(format!("prepare list leads: {}", e)))?;
        let leads = stmt
            .query_map(params![user_id], lead_from_row)
            .map_err(|e| Error::Db(format!("query leads: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Db(format!("read lead row: {}", e)))?;
        Ok(leads)
    }

    /// Fetch one lead by id.
    pub fn get_lead(&self, user_id: &str, id: Uuid) -> Result<Option<Lead>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM leads WHERE user_id = ?1 AND id = ?2",
                LEAD_COLUMNS
            ),
            params![user_id, id.to_string()],
            lead_from_row,
        )
        .optional()
        .map_err(|e| Error::Db(format!("get lead: {}", e)))
    }

    /// Create a lead owned by the caller. Value is clamped non-negative.
    pub fn create_lead(&self, user_id: &str, new: NewLead) -> Result<Lead> {
        let lead = Lead {
            id: Uuid::new_v4(),
            created_at: now_ms(),
            client_name: new.client_name,
            project_type: new.project_type,
            heat_level: new.heat_level,
            status: new.status,
            value: new.value.max(0),
            notes: new.notes,
            last_synced_at: None,
            user_id: user_id.to_string(),
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO leads (id, created_at, client_name, project_type, heat_level, status, \
             project_value, notes, last_synced_at, user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                lead.id.to_string(),
                lead.created_at,
                lead.client_name,
                lead.project_type,
                lead.heat_level.to_string(),
                lead.status.as_str(),
                lead.value,
                lead.notes,
                lead.last_synced_at,
                lead.user_id,
            ],
        )
        .map_err(|e| Error::Db(format!("insert lead: {}", e)))?;
        Ok(lead)
    }

    /// Apply a partial update. Every update stamps a fresh last_synced_at.
    /// Returns false when no lead with that id belongs to the caller.
    pub fn update_lead(&self, user_id: &str, id: Uuid, updates: LeadUpdate) -> Result<bool> {
        let Some(current) = self.get_lead(user_id, id)? else {
            return Ok(false);
        };
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE leads SET client_name = ?1, project_type = ?2, heat_level = ?3, \
                 status = ?4, project_value = ?5, notes = ?6, last_synced_at = ?7 \
                 WHERE user_id = ?8 AND id = ?9",
                params![
                    updates.client_name.unwrap_or(current.client_name),
                    updates.project_type.unwrap_or(current.project_type),
                    updates.heat_level.unwrap_or(current.heat_level).to_string(),
                    updates.status.unwrap_or(current.status).as_str(),
                    updates.value.map(|v| v.max(0)).unwrap_or(current.value),
                    updates.notes.unwrap_or(current.notes),
                    now_ms(),
                    user_id,
                    id.to_string(),
                ],
            )
            .map_err(|e| Error::Db(format!("update lead: {}", e)))?;
        Ok(changed > 0)
    }

    /// Write a status token through as-is after canonicalizing its casing.
    /// Tokens outside the five known stages are stored verbatim; reads map
    /// them back to `New`.
    pub fn update_lead_status(&self, user_id: &str, id: Uuid, status_token: &str) -> Result<String> {
        let status = PipelineStatus::canonicalize(status_token);
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE leads SET status = ?1, last_synced_at = ?2 WHERE user_id = ?3 AND id = ?4",
                params![status, now_ms(), user_id, id.to_string()],
            )
            .map_err(|e| Error::Db(format!("update lead status: {}", e)))?;
        if changed == 0 {
            return Err(Error::NotFound(format!("lead {}", id)));
        }
        Ok(status)
    }

    /// Case-insensitive substring lookup by client name. Ambiguous queries
    /// return the most recently created match.
    pub fn find_lead_by_name(&self, user_id: &str, query: &str) -> Result<Option<Lead>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM leads WHERE user_id = ?1 \
                 AND instr(lower(client_name), lower(?2)) > 0 \
                 ORDER BY created_at DESC LIMIT 1",
                LEAD_COLUMNS
            ),
            params![user_id, query.trim()],
            lead_from_row,
        )
        .optional()
        .map_err(|e| Error::Db(format!("find lead by name: {}", e)))
    }

    /// Insert external leads whose client name is not already present
    /// (case-insensitive exact match). Existing rows are never updated from
    /// the source. Returns the number of inserted leads.
    pub fn sync_from_source(&self, user_id: &str, incoming: &[SourceLead]) -> Result<usize> {
        let existing: Vec<String> = {
            let conn = self.conn()?;
            let mut stmt = conn
                .prepare("SELECT lower(client_name) FROM leads WHERE user_id = ?1")
                .map_err(|e| Error::Db(format!("prepare existing names: {}", e)))?;
            let names = stmt
                .query_map(params![user_id], |row| row.get::<_, String>(0))
                .map_err(|e| Error::Db(format!("query existing names: {}", e)))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| Error::Db(format!("read existing name: {}", e)))?;
            names
        };
        let existing: std::collections::HashSet<String> = existing.into_iter().collect();

        let mut inserted = 0;
        for source in incoming {
            if existing.contains(&source.client_name.to_lowercase()) {
                continue;
            }
            self.create_lead(
                user_id,
                NewLead {
                    client_name: source.client_name.clone(),
                    project_type: source.project_type.clone(),
                    heat_level: source.heat_level,
                    status: source.status,
                    notes: source.notes.clone(),
                    value: source.value,
                },
            )?;
            inserted += 1;
        }
        if inserted > 0 {
            tracing::info!("Synced {} leads from external source", inserted);
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::db::test_support::temp_store;
    use super::*;

    fn sample_lead(name: &str, value: i64) -> NewLead {
        NewLead {
            client_name: name.to_string(),
            project_type: "Web Redesign".to_string(),
            heat_level: HeatLevel::Hot,
            status: PipelineStatus::New,
            notes: "Needs a refresh for Q3.".to_string(),
            value,
        }
    }

    fn source_lead(name: &str) -> SourceLead {
        SourceLead {
            id: "2".to_string(),
            client_name: name.to_string(),
            project_type: "Mobile App".to_string(),
            heat_level: HeatLevel::Warm,
            status: PipelineStatus::New,
            notes: String::new(),
            value: 500,
        }
    }

    #[test]
    fn create_then_read_round_trips_fields() {
        let (_dir, store) = temp_store();
        let created = store.create_lead("u1", sample_lead("Lava Cafe", 300)).unwrap();

        let read = store.get_lead("u1", created.id).unwrap().unwrap();
        assert_eq!(read.client_name, "Lava Cafe");
        assert_eq!(read.project_type, "Web Redesign");
        assert_eq!(read.heat_level, HeatLevel::Hot);
        assert_eq!(read.status, PipelineStatus::New);
        assert_eq!(read.value, 300);
        assert_eq!(read.notes, "Needs a refresh for Q3.");
    }

    #[test]
    fn leads_are_scoped_to_their_owner() {
        let (_dir, store) = temp_store();
        store.create_lead("u1", sample_lead("Acme", 100)).unwrap();
        store.create_lead("u2", sample_lead("Globex", 200)).unwrap();

        let mine = store.list_leads("u1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].client_name, "Acme");
    }

    #[test]
    fn negative_values_are_clamped_on_intake() {
        let (_dir, store) = temp_store();
        let created = store.create_lead("u1", sample_lead("Acme", -50)).unwrap();
        assert_eq!(created.value, 0);
    }

    #[test]
    fn update_stamps_increasing_last_synced_at() {
        let (_dir, store) = temp_store();
        let lead = store.create_lead("u1", sample_lead("Acme", 100)).unwrap();

        let updates = LeadUpdate {
            status: Some(PipelineStatus::Working),
            ..Default::default()
        };
        assert!(store.update_lead("u1", lead.id, updates).unwrap());
        let first = store.get_lead("u1", lead.id).unwrap().unwrap();
        let first_stamp = first.last_synced_at.expect("stamped");
        assert_eq!(first.status, PipelineStatus::Working);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let updates = LeadUpdate {
            value: Some(900),
            ..Default::default()
        };
        assert!(store.update_lead("u1", lead.id, updates).unwrap());
        let second = store.get_lead("u1", lead.id).unwrap().unwrap();
        assert!(second.last_synced_at.expect("stamped") > first_stamp);
        // Unrelated fields survive a partial update.
        assert_eq!(second.status, PipelineStatus::Working);
        assert_eq!(second.value, 900);
    }

    #[test]
    fn update_unknown_lead_reports_missing() {
        let (_dir, store) = temp_store();
        let ok = store
            .update_lead("u1", Uuid::new_v4(), LeadUpdate::default())
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn raw_status_tokens_are_canonicalized_or_passed_through() {
        let (_dir, store) = temp_store();
        let lead = store.create_lead("u1", sample_lead("Acme", 100)).unwrap();

        let stored = store.update_lead_status("u1", lead.id, "done").unwrap();
        assert_eq!(stored, "Done");

        let stored = store.update_lead_status("u1", lead.id, "Archived").unwrap();
        assert_eq!(stored, "Archived");
        // Unknown tokens fall back to New on read.
        let read = store.get_lead("u1", lead.id).unwrap().unwrap();
        assert_eq!(read.status, PipelineStatus::New);
    }

    #[test]
    fn fuzzy_find_matches_substring_case_insensitive() {
        let (_dir, store) = temp_store();
        store.create_lead("u1", sample_lead("Lava Cafe", 300)).unwrap();

        let hit = store.find_lead_by_name("u1", "lava").unwrap();
        assert_eq!(hit.unwrap().client_name, "Lava Cafe");

        let miss = store.find_lead_by_name("u1", "acme").unwrap();
        assert!(miss.is_none());

        // Other users' leads are invisible.
        let foreign = store.find_lead_by_name("u2", "lava").unwrap();
        assert!(foreign.is_none());
    }

    #[test]
    fn sync_skips_existing_names_case_insensitive() {
        let (_dir, store) = temp_store();
        store.create_lead("u1", sample_lead("Lava Cafe", 300)).unwrap();

        let incoming = vec![source_lead("LAVA CAFE"), source_lead("Global Tech")];
        let inserted = store.sync_from_source("u1", &incoming).unwrap();
        assert_eq!(inserted, 1);

        // Running the same sync again inserts nothing.
        let inserted = store.sync_from_source("u1", &incoming).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.list_leads("u1").unwrap().len(), 2);
    }
}
