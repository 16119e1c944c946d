//! Tool directive extraction and dispatch.
//!
//! The model is asked to emit JSON for actions but replies in free text, so
//! the dispatcher hunts for an embedded JSON value, decodes each entry into a
//! tagged union, and executes the ones it recognizes. Anything that fails to
//! parse leaves the raw reply untouched (silent fallback to conversation).

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::store::Store;

use super::actions;
use super::provider::CompletionProvider;

/// A structured action request embedded in an AI reply.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "tool")]
pub enum ToolDirective {
    #[serde(rename = "update_status")]
    UpdateStatus { client: String, status: String },
    #[serde(rename = "generate_proposal")]
    GenerateProposal { client: String },
    #[serde(rename = "financial_report")]
    FinancialReport,
}

/// Locate the first bracketed array (else brace object) in the reply and
/// strip any markdown fence markers.
fn json_blob(reply: &str) -> Option<String> {
    let array_re = Regex::new(r"(?s)\[.*\]").ok()?;
    let object_re = Regex::new(r"(?s)\{.*\}").ok()?;
    let found = array_re.find(reply).or_else(|| object_re.find(reply))?;
    Some(found.as_str().replace("```json", "").replace("```", ""))
}

/// Decode tool directives from a raw reply. `None` means no parsable JSON was
/// found and the reply should pass through as conversation; `Some` means a
/// JSON value parsed, with unrecognized entries already skipped.
pub fn extract_directives(reply: &str) -> Option<Vec<ToolDirective>> {
    let blob = json_blob(reply)?;
    let value: Value = match serde_json::from_str(&blob) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Reply JSON did not parse, treating as conversation: {}", e);
            return None;
        }
    };
    let entries = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => return None,
    };
    Some(
        entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<ToolDirective>(entry).ok())
            .collect(),
    )
}

/// Execute directives embedded in a reply. Returns the joined per-entry
/// results when a JSON value parsed, otherwise the raw reply. Writes are
/// immediate and per-entry; there is no transactional grouping.
pub async fn dispatch(
    store: &Store,
    provider: &dyn CompletionProvider,
    user_id: &str,
    reply: &str,
) -> String {
    let Some(directives) = extract_directives(reply) else {
        return reply.to_string();
    };

    let mut results = Vec::new();
    for directive in directives {
        match directive {
            ToolDirective::UpdateStatus { client, status } => {
                match store.find_lead_by_name(user_id, &client) {
                    Ok(Some(lead)) => match actions::update_status(store, user_id, &lead, &status) {
                        Ok(text) => results.push(format!("[STATUS] {}", text)),
                        Err(e) => results.push(format!("[ERROR] {}", e)),
                    },
                    Ok(None) => results.push(format!("[ERROR] Client '{}' not found.", client)),
                    Err(e) => results.push(format!("[ERROR] {}", e)),
                }
            }
            ToolDirective::GenerateProposal { client } => {
                match store.find_lead_by_name(user_id, &client) {
                    Ok(Some(lead)) => {
                        match actions::generate_and_archive_proposal(store, provider, user_id, &lead)
                            .await
                        {
                            Ok(text) => results.push(format!("[PROPOSAL] {}", text)),
                            Err(e) => results.push(format!("[ERROR] {}", e)),
                        }
                    }
                    Ok(None) => results.push(format!("[ERROR] Client '{}' not found.", client)),
                    Err(e) => results.push(format!("[ERROR] {}", e)),
                }
            }
            ToolDirective::FinancialReport => match actions::financial_report(store, user_id) {
                Ok(text) => results.push(format!("[FINANCE] {}", text)),
                Err(e) => results.push(format!("[ERROR] {}", e)),
            },
        }
    }

    results.join("\n")
}

#[cfg(test)]
mod tests {
    use super::super::provider::test_support::ScriptedProvider;
    use super::*;
    use crate::model::{HeatLevel, NewLead, PipelineStatus};

    fn store_with_leads() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("t.db")).unwrap();
        for (name, value, status) in [
            ("Lava Cafe", 1500, PipelineStatus::Working),
            ("Global Tech", 5000, PipelineStatus::InTalk),
            ("Startup Inc", 800, PipelineStatus::New),
        ] {
            store
                .create_lead(
                    "u1",
                    NewLead {
                        client_name: name.to_string(),
                        project_type: "Web Redesign".to_string(),
                        heat_level: HeatLevel::Hot,
                        status,
                        notes: "Launch next week.".to_string(),
                        value,
                    },
                )
                .unwrap();
        }
        (dir, store)
    }

    #[test]
    fn extracts_single_object_directive() {
        let reply = r#"Moving the card now. {"tool":"update_status","client":"Lava","status":"Done"}"#;
        let directives = extract_directives(reply).unwrap();
        assert_eq!(
            directives,
            vec![ToolDirective::UpdateStatus {
                client: "Lava".to_string(),
                status: "Done".to_string(),
            }]
        );
    }

    #[test]
    fn extracts_fenced_array_in_order() {
        let reply = "Here you go:\n```json\n[\n  {\"tool\":\"update_status\",\"client\":\"Lava\",\"status\":\"Done\"},\n  {\"tool\":\"financial_report\"}\n]\n```";
        let directives = extract_directives(reply).unwrap();
        assert_eq!(directives.len(), 2);
        assert!(matches!(directives[0], ToolDirective::UpdateStatus { .. }));
        assert!(matches!(directives[1], ToolDirective::FinancialReport));
    }

    #[test]
    fn unknown_tools_and_bad_shapes_are_skipped() {
        let reply = r#"[{"tool":"delete_everything"},{"tool":"update_status","client":"Lava"},{"tool":"financial_report"}]"#;
        let directives = extract_directives(reply).unwrap();
        // delete_everything is unknown; update_status is missing its status
        // field; only the report survives.
        assert_eq!(directives, vec![ToolDirective::FinancialReport]);
    }

    #[test]
    fn malformed_json_yields_no_directives() {
        assert!(extract_directives("plain conversational reply").is_none());
        assert!(extract_directives(r#"{"tool":"update_status","client":"Lava""#).is_none());
    }

    #[tokio::test]
    async fn malformed_json_passes_raw_reply_through() {
        let (_dir, store) = store_with_leads();
        let provider = ScriptedProvider::failing();
        let reply = r#"{"tool":"update_status","client":"Lava""#;
        let out = dispatch(&store, &provider, "u1", reply).await;
        assert_eq!(out, reply);
    }

    #[tokio::test]
    async fn fuzzy_update_status_resolves_and_confirms() {
        let (_dir, store) = store_with_leads();
        let provider = ScriptedProvider::failing();
        let reply = r#"{"tool":"update_status","client":"Lava","status":"Done"}"#;
        let out = dispatch(&store, &provider, "u1", reply).await;
        assert_eq!(out, "[STATUS] Updated status to Done");

        let lead = store.find_lead_by_name("u1", "Lava Cafe").unwrap().unwrap();
        assert_eq!(lead.status, PipelineStatus::Done);
    }

    #[tokio::test]
    async fn unknown_client_surfaces_inline_error() {
        let (_dir, store) = store_with_leads();
        let provider = ScriptedProvider::failing();
        let reply = r#"{"tool":"update_status","client":"Acme","status":"Done"}"#;
        let out = dispatch(&store, &provider, "u1", reply).await;
        assert_eq!(out, "[ERROR] Client 'Acme' not found.");
    }

    #[tokio::test]
    async fn fenced_array_executes_both_entries_in_order() {
        let (_dir, store) = store_with_leads();
        let provider = ScriptedProvider::new(&["Draft proposal text."]);
        let reply = "```json\n[{\"tool\":\"generate_proposal\",\"client\":\"global\"},{\"tool\":\"financial_report\"}]\n```";
        let out = dispatch(&store, &provider, "u1", reply).await;

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[PROPOSAL] Proposal generated and archived.");
        assert_eq!(
            lines[1],
            "[FINANCE] Total pipeline value: 7300 OMR | Goal progress: 365% of 2000 OMR | Active projects: 1"
        );

        // The drafted proposal was archived for the resolved lead.
        let lead = store.find_lead_by_name("u1", "Global Tech").unwrap().unwrap();
        let analysis = store.get_project_analysis("u1", lead.id).unwrap().unwrap();
        assert_eq!(analysis.proposal_content.as_deref(), Some("Draft proposal text."));
    }

    #[tokio::test]
    async fn proposal_provider_failure_becomes_inline_error() {
        let (_dir, store) = store_with_leads();
        let provider = ScriptedProvider::failing();
        let reply = r#"{"tool":"generate_proposal","client":"Lava"}"#;
        let out = dispatch(&store, &provider, "u1", reply).await;
        assert!(out.starts_with("[ERROR]"), "got: {}", out);

        // Nothing was archived.
        let lead = store.find_lead_by_name("u1", "Lava").unwrap().unwrap();
        assert!(store.get_project_analysis("u1", lead.id).unwrap().is_none());
    }
}
