//! Core CRM domain types.
//!
//! Wire JSON uses camelCase; database columns use snake_case. Both
//! translations happen at their respective boundaries (serde here, row
//! mapping in the store).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Informal urgency/interest rating of a lead.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeatLevel {
    Cold,
    Warm,
    Hot,
}

impl Default for HeatLevel {
    fn default() -> Self {
        HeatLevel::Warm
    }
}

impl std::fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeatLevel::Cold => write!(f, "Cold"),
            HeatLevel::Warm => write!(f, "Warm"),
            HeatLevel::Hot => write!(f, "Hot"),
        }
    }
}

impl HeatLevel {
    /// Parse a stored token, falling back to `Cold` for anything unknown.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "Warm" => HeatLevel::Warm,
            "Hot" => HeatLevel::Hot,
            _ => HeatLevel::Cold,
        }
    }
}

/// Stage of an engagement in the pipeline.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStatus {
    New,
    #[serde(rename = "In Talk")]
    InTalk,
    Working,
    Testing,
    Done,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        PipelineStatus::New
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 5] = [
        PipelineStatus::New,
        PipelineStatus::InTalk,
        PipelineStatus::Working,
        PipelineStatus::Testing,
        PipelineStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::New => "New",
            PipelineStatus::InTalk => "In Talk",
            PipelineStatus::Working => "Working",
            PipelineStatus::Testing => "Testing",
            PipelineStatus::Done => "Done",
        }
    }

    /// Case-insensitive match against the five valid stage names.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Parse a stored token, falling back to `New` for anything unknown.
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or(PipelineStatus::New)
    }

    /// Map a free-form status token to its canonical casing when it matches
    /// one of the five stages, otherwise pass the raw token through. The
    /// write-through of unmatched tokens preserves the permissive behavior of
    /// the `/move` command and the `update_status` tool.
    pub fn canonicalize(token: &str) -> String {
        match Self::parse(token) {
            Some(status) => status.as_str().to_string(),
            None => token.to_string(),
        }
    }
}

/// A prospective or active client engagement record.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub created_at: i64,
    pub client_name: String,
    pub project_type: String,
    pub heat_level: HeatLevel,
    pub status: PipelineStatus,
    pub value: i64,
    #[serde(default)]
    pub notes: String,
    pub last_synced_at: Option<i64>,
    pub user_id: String,
}

impl Lead {
    /// Millisecond timestamp of the most recent write to this lead.
    pub fn last_update_ms(&self) -> i64 {
        self.last_synced_at.unwrap_or(self.created_at)
    }
}

/// Intake payload for a new lead. Value is clamped non-negative on insert.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub client_name: String,
    pub project_type: String,
    #[serde(default)]
    pub heat_level: HeatLevel,
    #[serde(default)]
    pub status: PipelineStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub value: i64,
}

/// Partial update applied to an existing lead.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    pub client_name: Option<String>,
    pub project_type: Option<String>,
    pub heat_level: Option<HeatLevel>,
    pub status: Option<PipelineStatus>,
    pub notes: Option<String>,
    pub value: Option<i64>,
}

impl LeadUpdate {
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.project_type.is_none()
            && self.heat_level.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.value.is_none()
    }
}

/// A lead row read from the external spreadsheet source.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SourceLead {
    pub id: String,
    pub client_name: String,
    pub project_type: String,
    pub heat_level: HeatLevel,
    pub status: PipelineStatus,
    pub notes: String,
    pub value: i64,
}

/// Delivery milestone inside a project.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub status: MilestoneStatus,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MilestoneStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

/// One-to-one extension of a lead holding communication logs and milestones.
/// Created lazily on first save.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub lead_id: Uuid,
    #[serde(default)]
    pub chat_logs: String,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    pub user_id: String,
}

/// Archival record of the latest AI-generated summary and proposal.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub lead_id: Uuid,
    pub technical_summary: Option<String>,
    pub proposal_content: Option<String>,
    pub last_updated: i64,
}

/// Speaker of a remembered chat turn.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl Role {
    pub fn parse_lossy(s: &str) -> Self {
        if s == "assistant" {
            Role::Assistant
        } else {
            Role::User
        }
    }
}

/// Channel a remembered chat turn arrived on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Web,
    Telegram,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Web => write!(f, "web"),
            Channel::Telegram => write!(f, "telegram"),
        }
    }
}

impl Channel {
    pub fn parse_lossy(s: &str) -> Self {
        if s == "telegram" {
            Channel::Telegram
        } else {
            Channel::Web
        }
    }
}

/// Append-only per-user conversation memory entry.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMessage {
    pub role: Role,
    pub content: String,
    pub channel: Channel,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(PipelineStatus::parse("done"), Some(PipelineStatus::Done));
        assert_eq!(PipelineStatus::parse("IN TALK"), Some(PipelineStatus::InTalk));
        assert_eq!(PipelineStatus::parse("shipped"), None);
    }

    #[test]
    fn status_canonicalize_passes_unknown_tokens_through() {
        assert_eq!(PipelineStatus::canonicalize("testing"), "Testing");
        assert_eq!(PipelineStatus::canonicalize("Archived"), "Archived");
    }

    #[test]
    fn status_wire_format_uses_display_names() {
        let json = serde_json::to_string(&PipelineStatus::InTalk).unwrap();
        assert_eq!(json, "\"In Talk\"");
        let back: PipelineStatus = serde_json::from_str("\"In Talk\"").unwrap();
        assert_eq!(back, PipelineStatus::InTalk);
    }

    #[test]
    fn lead_serializes_camel_case() {
        let lead = Lead {
            id: Uuid::nil(),
            created_at: 1,
            client_name: "Acme Corp".to_string(),
            project_type: "Web Redesign".to_string(),
            heat_level: HeatLevel::Hot,
            status: PipelineStatus::New,
            value: 1500,
            notes: String::new(),
            last_synced_at: None,
            user_id: "u1".to_string(),
        };
        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["clientName"], "Acme Corp");
        assert_eq!(json["heatLevel"], "Hot");
        assert!(json.get("client_name").is_none());
    }
}
