//! Project details and the archived analysis record.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Milestone, ProjectAnalysis, ProjectDetails};

use super::Store;

/// Partial write for project details.
#[derive(Clone, Debug, Default)]
pub struct ProjectDetailsUpdate {
    pub chat_logs: Option<String>,
    pub milestones: Option<Vec<Milestone>>,
}

/// Partial write for the analysis archive.
#[derive(Clone, Debug, Default)]
pub struct AnalysisUpdate {
    pub technical_summary: Option<String>,
    pub proposal_content: Option<String>,
}

impl Store {
    pub fn get_project_details(&self, user_id: &str, lead_id: Uuid) -> Result<Option<ProjectDetails>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT lead_id, chat_logs, milestones, user_id FROM project_details \
             WHERE user_id = ?1 AND lead_id = ?2",
            params![user_id, lead_id.to_string()],
            |row| {
                let milestones: String = row.get(2)?;
                Ok(ProjectDetails {
                    lead_id,
                    chat_logs: row.get(1)?,
                    milestones: serde_json::from_str(&milestones).unwrap_or_default(),
                    user_id: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| Error::Db(format!("get project details: {}", e)))
    }

    /// Save details, creating the row lazily on first write. Fields not in
    /// the update keep their stored values.
    pub fn save_project_details(
        &self,
        user_id: &str,
        lead_id: Uuid,
        update: ProjectDetailsUpdate,
    ) -> Result<()> {
        let current = self.get_project_details(user_id, lead_id)?.unwrap_or(ProjectDetails {
            lead_id,
            chat_logs: String::new(),
            milestones: Vec::new(),
            user_id: user_id.to_string(),
        });
        let chat_logs = update.chat_logs.unwrap_or(current.chat_logs);
        let milestones = update.milestones.unwrap_or(current.milestones);
        let milestones_json = serde_json::to_string(&milestones)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO project_details (lead_id, chat_logs, milestones, user_id) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(lead_id) DO UPDATE SET chat_logs = ?2, milestones = ?3",
            params![lead_id.to_string(), chat_logs, milestones_json, user_id],
        )
        .map_err(|e| Error::Db(format!("save project details: {}", e)))?;
        Ok(())
    }

    pub fn get_project_analysis(&self, user_id: &str, lead_id: Uuid) -> Result<Option<ProjectAnalysis>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT lead_id, technical_summary, proposal_content, last_updated \
             FROM project_analysis WHERE user_id = ?1 AND lead_id = ?2",
            params![user_id, lead_id.to_string()],
            |row| {
                Ok(ProjectAnalysis {
                    lead_id,
                    technical_summary: row.get(1)?,
                    proposal_content: row.get(2)?,
                    last_updated: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| Error::Db(format!("get project analysis: {}", e)))
    }

    /// Upsert the analysis archive, stamping last_updated. Fields not in the
    /// update keep their stored values so a proposal write never clears an
    /// archived technical summary.
    pub fn save_project_analysis(
        &self,
        user_id: &str,
        lead_id: Uuid,
        update: AnalysisUpdate,
    ) -> Result<()> {
        let current = self.get_project_analysis(user_id, lead_id)?;
        let technical_summary = update
            .technical_summary
            .or_else(|| current.as_ref().and_then(|a| a.technical_summary.clone()));
        let proposal_content = update
            .proposal_content
            .or_else(|| current.as_ref().and_then(|a| a.proposal_content.clone()));

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO project_analysis (lead_id, technical_summary, proposal_content, \
             last_updated, user_id) VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(lead_id) DO UPDATE SET technical_summary = ?2, \
             proposal_content = ?3, last_updated = ?4",
            params![
                lead_id.to_string(),
                technical_summary,
                proposal_content,
                chrono::Utc::now().timestamp_millis(),
                user_id,
            ],
        )
        .map_err(|e| Error::Db(format!("save project analysis: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::db::test_support::temp_store;
    use super::*;
    use crate::model::MilestoneStatus;

    #[test]
    fn details_are_created_lazily_and_merged() {
        let (_dir, store) = temp_store();
        let lead_id = Uuid::new_v4();

        assert!(store.get_project_details("u1", lead_id).unwrap().is_none());

        store
            .save_project_details(
                "u1",
                lead_id,
                ProjectDetailsUpdate {
                    chat_logs: Some("Kickoff call done.".to_string()),
                    milestones: None,
                },
            )
            .unwrap();

        store
            .save_project_details(
                "u1",
                lead_id,
                ProjectDetailsUpdate {
                    chat_logs: None,
                    milestones: Some(vec![Milestone {
                        id: "m1".to_string(),
                        title: "Wireframes".to_string(),
                        status: MilestoneStatus::InProgress,
                    }]),
                },
            )
            .unwrap();

        let details = store.get_project_details("u1", lead_id).unwrap().unwrap();
        assert_eq!(details.chat_logs, "Kickoff call done.");
        assert_eq!(details.milestones.len(), 1);
        assert_eq!(details.milestones[0].status, MilestoneStatus::InProgress);
    }

    #[test]
    fn analysis_upsert_preserves_other_field() {
        let (_dir, store) = temp_store();
        let lead_id = Uuid::new_v4();

        store
            .save_project_analysis(
                "u1",
                lead_id,
                AnalysisUpdate {
                    technical_summary: Some("Needs load balancing.".to_string()),
                    proposal_content: None,
                },
            )
            .unwrap();
        store
            .save_project_analysis(
                "u1",
                lead_id,
                AnalysisUpdate {
                    technical_summary: None,
                    proposal_content: Some("Proposal v1".to_string()),
                },
            )
            .unwrap();

        let analysis = store.get_project_analysis("u1", lead_id).unwrap().unwrap();
        assert_eq!(analysis.technical_summary.as_deref(), Some("Needs load balancing."));
        assert_eq!(analysis.proposal_content.as_deref(), Some("Proposal v1"));
        assert!(analysis.last_updated > 0);
    }

    #[test]
    fn analysis_is_scoped_to_its_owner() {
        let (_dir, store) = temp_store();
        let lead_id = Uuid::new_v4();
        store
            .save_project_analysis(
                "u1",
                lead_id,
                AnalysisUpdate {
                    technical_summary: Some("private".to_string()),
                    proposal_content: None,
                },
            )
            .unwrap();
        assert!(store.get_project_analysis("u2", lead_id).unwrap().is_none());
    }
}
