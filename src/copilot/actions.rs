//! Side-effecting copilot tools: status moves, proposal drafting, and the
//! financial report.

use crate::error::{Error, Result};
use crate::model::{Lead, PipelineStatus};
use crate::store::{AnalysisUpdate, Store};

use super::provider::{ChatMessage, CompletionProvider};

/// Monthly pipeline revenue goal.
pub const REVENUE_GOAL_OMR: i64 = 2_000;

/// Write a status token through to a lead. Returns the confirmation text.
pub fn update_status(store: &Store, user_id: &str, lead: &Lead, status_token: &str) -> Result<String> {
    let stored = store.update_lead_status(user_id, lead.id, status_token)?;
    Ok(format!("Updated status to {}", stored))
}

fn proposal_prompt(lead: &Lead) -> String {
    format!(
        "Act as a professional proposal writer.\n\
         Client: {}\n\
         Value: {} OMR\n\
         Notes: {}\n\n\
         Generate a concise, high-impact project proposal (max 300 words).\n\
         Include: Strategy, Deliverables, Investment.\n\
         Format: Plain text.",
        lead.client_name, lead.value, lead.notes
    )
}

/// Draft a proposal from the lead's value and notes, then archive it.
pub async fn generate_and_archive_proposal(
    store: &Store,
    provider: &dyn CompletionProvider,
    user_id: &str,
    lead: &Lead,
) -> Result<String> {
    let proposal = provider
        .chat(vec![ChatMessage::user(proposal_prompt(lead))])
        .await
        .map_err(|e| Error::Provider(format!("proposal generation failed: {}", e)))?;

    store.save_project_analysis(
        user_id,
        lead.id,
        AnalysisUpdate {
            technical_summary: None,
            proposal_content: Some(proposal),
        },
    )?;

    Ok("Proposal generated and archived.".to_string())
}

/// Single-line pipeline report: total value, goal progress, active count.
pub fn financial_report(store: &Store, user_id: &str) -> Result<String> {
    let leads = store.list_leads(user_id)?;
    let total: i64 = leads.iter().map(|l| l.value).sum();
    let active = leads
        .iter()
        .filter(|l| l.status == PipelineStatus::Working)
        .count();
    let progress = ((total as f64 / REVENUE_GOAL_OMR as f64) * 100.0).round() as i64;

    Ok(format!(
        "Total pipeline value: {} OMR | Goal progress: {}% of {} OMR | Active projects: {}",
        total, progress, REVENUE_GOAL_OMR, active
    ))
}
