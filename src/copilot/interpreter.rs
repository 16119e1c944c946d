//! Free-text command interpretation: context assembly, the provider call,
//! detached memory persistence, and tool dispatch.

use crate::error::Result;
use crate::model::Channel;
use crate::store::Store;

use super::context::{
    deep_client_context, detect_client, pipeline_summary, render_deep_context, render_memory_tail,
    system_prompt, MEMORY_WINDOW,
};
use super::dispatch::dispatch;
use super::memory::MemoryWriter;
use super::provider::{ChatMessage, CompletionProvider};

/// Interpret one free-text command for a user and return the reply text.
///
/// Provider failure degrades to an empty reply; memory persistence is
/// detached and never fails the request. Errors out only when the store
/// itself is unreadable.
pub async fn run_command(
    store: &Store,
    provider: &dyn CompletionProvider,
    memory: &MemoryWriter,
    user_id: &str,
    channel: Channel,
    command: &str,
) -> Result<String> {
    let leads = store.list_leads(user_id)?;
    let summary = pipeline_summary(&leads);

    let focused = match detect_client(command, &leads) {
        Some(lead) => {
            let ctx = deep_client_context(store, user_id, lead)?;
            render_deep_context(&ctx)
        }
        None => String::new(),
    };

    let history = store.recent_memory(user_id, MEMORY_WINDOW)?;
    let prompt = system_prompt(&summary, &focused, &render_memory_tail(&history));

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(prompt));
    messages.extend(history.iter().map(|m| ChatMessage {
        role: m.role.to_string(),
        content: m.content.clone(),
    }));
    messages.push(ChatMessage::user(command));

    let reply = match provider.chat(messages).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Provider call failed, degrading to empty reply: {}", e);
            String::new()
        }
    };

    memory.record_exchange(user_id, channel, command, &reply);

    Ok(dispatch(store, provider, user_id, &reply).await)
}

#[cfg(test)]
mod tests {
    use super::super::provider::test_support::ScriptedProvider;
    use super::*;
    use crate::model::{HeatLevel, NewLead, PipelineStatus};

    fn fixture() -> (tempfile::TempDir, Store, MemoryWriter) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("t.db")).unwrap();
        let writer = MemoryWriter::spawn(store.clone());
        store
            .create_lead(
                "u1",
                NewLead {
                    client_name: "Lava Cafe".to_string(),
                    project_type: "Social Media".to_string(),
                    heat_level: HeatLevel::Hot,
                    status: PipelineStatus::Working,
                    notes: "Wants to launch next week.".to_string(),
                    value: 300,
                },
            )
            .unwrap();
        (dir, store, writer)
    }

    #[tokio::test]
    async fn conversational_reply_passes_through() {
        let (_dir, store, writer) = fixture();
        let provider = ScriptedProvider::new(&["Lava Cafe is in Working, no blockers."]);

        let reply = run_command(&store, &provider, &writer, "u1", Channel::Web, "status of Lava Cafe?")
            .await
            .unwrap();
        assert_eq!(reply, "Lava Cafe is in Working, no blockers.");
    }

    #[tokio::test]
    async fn tool_reply_is_dispatched() {
        let (_dir, store, writer) = fixture();
        let provider =
            ScriptedProvider::new(&[r#"{"tool":"update_status","client":"Lava","status":"Done"}"#]);

        let reply = run_command(&store, &provider, &writer, "u1", Channel::Web, "move Lava Cafe to Done")
            .await
            .unwrap();
        assert_eq!(reply, "[STATUS] Updated status to Done");

        let lead = store.find_lead_by_name("u1", "Lava").unwrap().unwrap();
        assert_eq!(lead.status, PipelineStatus::Done);
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_empty_reply() {
        let (_dir, store, writer) = fixture();
        let provider = ScriptedProvider::failing();

        let reply = run_command(&store, &provider, &writer, "u1", Channel::Web, "hello")
            .await
            .unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn exchange_lands_in_memory() {
        let (_dir, store, writer) = fixture();
        let provider = ScriptedProvider::new(&["Noted."]);

        run_command(&store, &provider, &writer, "u1", Channel::Web, "remember the launch date")
            .await
            .unwrap();

        for _ in 0..50 {
            if store.recent_memory("u1", 10).unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let turns = store.recent_memory("u1", 10).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "remember the launch date");
        assert_eq!(turns[1].content, "Noted.");
    }
}
