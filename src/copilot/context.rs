//! Prompt context assembly: pipeline summary, deep client context, and the
//! recent-memory tail.

use crate::copilot::actions::REVENUE_GOAL_OMR;
use crate::error::Result;
use crate::model::{Lead, MemoryMessage, Milestone, PipelineStatus};
use crate::store::Store;

/// Days of inactivity after which a Working lead counts as stagnant.
pub const STAGNATION_DAYS: i64 = 7;

/// How many memory turns are replayed into the provider request.
pub const MEMORY_WINDOW: usize = 15;

/// How many of those turns are rendered into the system prompt.
const MEMORY_TAIL: usize = 3;

/// Assembled bundle of a single client's state used to focus the prompt.
#[derive(Clone, Debug)]
pub struct DeepContext {
    pub client: String,
    pub status: PipelineStatus,
    pub value: i64,
    pub stagnant: bool,
    pub days_inactive: i64,
    pub technical_summary: String,
    pub latest_proposal: String,
    pub recent_chat_logs: String,
    pub milestones: Vec<Milestone>,
}

/// One line per lead, or a fixed marker for an empty pipeline.
pub fn pipeline_summary(leads: &[Lead]) -> String {
    if leads.is_empty() {
        return "No leads.".to_string();
    }
    leads
        .iter()
        .map(|l| format!("- {} ({})", l.client_name, l.status))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First lead whose client name appears in the command, case-insensitive.
pub fn detect_client<'a>(command: &str, leads: &'a [Lead]) -> Option<&'a Lead> {
    let command = command.to_lowercase();
    leads
        .iter()
        .find(|l| command.contains(&l.client_name.to_lowercase()))
}

/// Ceiling of whole days between two millisecond timestamps.
pub fn days_between(from_ms: i64, to_ms: i64) -> i64 {
    let diff = (to_ms - from_ms).max(0);
    (diff + 86_400_000 - 1) / 86_400_000
}

/// Gather the deep-dive bundle for one lead.
pub fn deep_client_context(store: &Store, user_id: &str, lead: &Lead) -> Result<DeepContext> {
    let details = store.get_project_details(user_id, lead.id)?;
    let analysis = store.get_project_analysis(user_id, lead.id)?;

    let days_inactive = days_between(lead.last_update_ms(), chrono::Utc::now().timestamp_millis());
    let stagnant = lead.status == PipelineStatus::Working && days_inactive > STAGNATION_DAYS;

    Ok(DeepContext {
        client: lead.client_name.clone(),
        status: lead.status,
        value: lead.value,
        stagnant,
        days_inactive,
        technical_summary: analysis
            .as_ref()
            .and_then(|a| a.technical_summary.clone())
            .unwrap_or_else(|| "No technical analysis archived.".to_string()),
        latest_proposal: analysis
            .and_then(|a| a.proposal_content)
            .unwrap_or_else(|| "No proposal drafted.".to_string()),
        recent_chat_logs: details
            .as_ref()
            .map(|d| d.chat_logs.clone())
            .filter(|logs| !logs.is_empty())
            .unwrap_or_else(|| "No recent team notes.".to_string()),
        milestones: details.map(|d| d.milestones).unwrap_or_default(),
    })
}

/// Render the deep context block for the system prompt.
pub fn render_deep_context(ctx: &DeepContext) -> String {
    let warning = if ctx.stagnant {
        format!(
            "\n⚠️ STAGNATION WARNING: Project in 'Working' for >{} days without updates.",
            STAGNATION_DAYS
        )
    } else {
        String::new()
    };
    let proposal_excerpt: String = ctx.latest_proposal.chars().take(200).collect();
    format!(
        "*** DEEP DIVE CONTEXT FOR: {} ***\n\
         Status: {} (Inactive for {} days){}\n\n\
         LATEST TECHNICAL ANALYSIS:\n{}\n\n\
         COMMUNICATION LOGS:\n{}\n\n\
         LATEST PROPOSAL DRAFT:\n{}...",
        ctx.client,
        ctx.status,
        ctx.days_inactive,
        warning,
        ctx.technical_summary,
        ctx.recent_chat_logs,
        proposal_excerpt,
    )
}

/// Last few turns rendered as role-tagged lines.
pub fn render_memory_tail(memory: &[MemoryMessage]) -> String {
    if memory.is_empty() {
        return "No prior conversation context.".to_string();
    }
    memory
        .iter()
        .rev()
        .take(MEMORY_TAIL)
        .rev()
        .map(|m| format!("[{}]: {}", m.role.to_string().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full system prompt: persona, context blocks, instruction set, and the
/// declared tool grammar.
pub fn system_prompt(summary: &str, focused: &str, memory_tail: &str) -> String {
    format!(
        r#"You are the Leadpilot copilot, a hands-on technical architect and chief of staff for a small agency.
Your goal is to maximize technical ROI, project velocity, and hit the OMR {goal} revenue target.
Do not offer generic project management advice. Focus on technical execution and unblocking delivery.

GLOBAL PIPELINE:
{summary}

{focused}

RECENT CONTEXT & MEMORY:
{memory}

INSTRUCTIONS:
1. If the user greets you, do not reply with a generic greeting. Look at the RECENT CONTEXT above and pick up the last topic.
2. Pull specific requirements, milestones, or proposals from the DEEP DIVE CONTEXT. Be specific with the data.
3. If the project is STAGNANT, proactively suggest a technical intervention to unblock it.
4. Be concise, high-density, and executive.
5. If you do not have enough data to be specific, ask one targeted technical question instead of inventing a plan.

AVAILABLE TOOLS (output JSON only when you want an action executed):

1. MOVE CARD: {{ "tool": "update_status", "client": "Name", "status": "New|In Talk|Working|Testing|Done" }}
2. GENERATE PROPOSAL: {{ "tool": "generate_proposal", "client": "Name" }}
3. FINANCIAL REPORT: {{ "tool": "financial_report" }}
"#,
        goal = REVENUE_GOAL_OMR,
        summary = summary,
        focused = focused,
        memory = memory_tail,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Channel, HeatLevel, Role};
    use uuid::Uuid;

    fn lead(name: &str, status: PipelineStatus, last_synced_at: Option<i64>) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            created_at: 0,
            client_name: name.to_string(),
            project_type: "Web Redesign".to_string(),
            heat_level: HeatLevel::Warm,
            status,
            value: 100,
            notes: String::new(),
            last_synced_at,
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn summary_lists_one_line_per_lead() {
        let leads = vec![
            lead("Acme", PipelineStatus::New, None),
            lead("Lava Cafe", PipelineStatus::Working, None),
        ];
        assert_eq!(pipeline_summary(&leads), "- Acme (New)\n- Lava Cafe (Working)");
        assert_eq!(pipeline_summary(&[]), "No leads.");
    }

    #[test]
    fn detect_client_is_case_insensitive() {
        let leads = vec![lead("Lava Cafe", PipelineStatus::New, None)];
        assert!(detect_client("move lava cafe to Done", &leads).is_some());
        assert!(detect_client("how is the pipeline", &leads).is_none());
    }

    #[test]
    fn days_between_rounds_up() {
        assert_eq!(days_between(0, 0), 0);
        assert_eq!(days_between(0, 1), 1);
        assert_eq!(days_between(0, 86_400_000), 1);
        assert_eq!(days_between(0, 86_400_001), 2);
    }

    #[test]
    fn stagnation_requires_working_and_a_week_idle() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("t.db")).unwrap();

        let now = chrono::Utc::now().timestamp_millis();
        let eight_days_ago = now - 8 * 86_400_000;

        let stale = lead("Acme", PipelineStatus::Working, Some(eight_days_ago));
        let ctx = deep_client_context(&store, "u1", &stale).unwrap();
        assert!(ctx.stagnant);
        assert!(ctx.days_inactive >= 8);

        let fresh = lead("Acme", PipelineStatus::Working, Some(now));
        let ctx = deep_client_context(&store, "u1", &fresh).unwrap();
        assert!(!ctx.stagnant);

        let idle_but_new = lead("Acme", PipelineStatus::New, Some(eight_days_ago));
        let ctx = deep_client_context(&store, "u1", &idle_but_new).unwrap();
        assert!(!ctx.stagnant);
    }

    #[test]
    fn deep_context_falls_back_when_nothing_archived() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("t.db")).unwrap();

        let ctx = deep_client_context(&store, "u1", &lead("Acme", PipelineStatus::New, None)).unwrap();
        assert_eq!(ctx.technical_summary, "No technical analysis archived.");
        assert_eq!(ctx.latest_proposal, "No proposal drafted.");
        assert_eq!(ctx.recent_chat_logs, "No recent team notes.");
    }

    #[test]
    fn memory_tail_renders_last_three_turns() {
        let turns: Vec<_> = (0..5)
            .map(|i| MemoryMessage {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: format!("turn {}", i),
                channel: Channel::Web,
                created_at: i,
            })
            .collect();
        let tail = render_memory_tail(&turns);
        assert_eq!(tail, "[USER]: turn 2\n[ASSISTANT]: turn 3\n[USER]: turn 4");
        assert_eq!(render_memory_tail(&[]), "No prior conversation context.");
    }
}
