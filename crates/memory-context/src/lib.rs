// crates/memory-context/src/lib.rs
//! Markdown context synthesis (L6, spec §4.7 continued / §6 MODULE):
//! renders the single `<agentkits-memory-context>` document a hook handler
//! hands back to the host agent, built from whatever sections
//! `ContextConfig` enables.

mod error;
mod sections;
mod tokens;

pub use error::{ContextError, ContextResult};
pub use tokens::{estimate_tokens, CONTEXT_TOKEN_BUDGET};

use agentkits_memory_core::settings::ContextConfig;
use agentkits_memory_store::Store;

const CONTEXT_TAG_OPEN: &str = "<agentkits-memory-context>";
const CONTEXT_TAG_CLOSE: &str = "</agentkits-memory-context>";

/// Renders the wrapped context document for `session_id`, gated section by
/// section on `config`'s toggle flags. `now_ms` is Unix epoch milliseconds,
/// passed in rather than read from the clock so this stays a pure function
/// of the store's contents.
pub fn build_context(store: &Store, session_id: &str, config: &ContextConfig, now_ms: u64) -> ContextResult<String> {
    let mut body = String::new();

    if config.show_tool_guidance {
        body.push_str(&sections::tool_usage_guidance());
        body.push('\n');
    }

    if config.show_summaries {
        let summaries = store.summaries_for_session_capped(session_id, config.max_summaries)?;
        body.push_str(&sections::render_summaries(&summaries));
    }

    if config.show_prompts {
        let prompts = store.prompts_for_session_capped(session_id, config.max_prompts)?;
        body.push_str(&sections::render_prompts(&prompts));
    }

    if config.show_observations {
        let observations = store.observations_for_session_capped(session_id, config.max_observations)?;
        body.push_str(&sections::render_activity(&observations, now_ms));
    }

    let shown_tokens = estimate_tokens(&body);
    body.push_str(&sections::render_footer(shown_tokens, CONTEXT_TOKEN_BUDGET));

    Ok(format!("{CONTEXT_TAG_OPEN}\n{body}{CONTEXT_TAG_CLOSE}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkits_memory_store::{NewObservation, NewSessionSummary};
    use agentkits_memory_core::ObservationType;

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "please read the settings file", 900).unwrap();
        store
            .insert_observation(NewObservation {
                id: "obs1".into(),
                session_id: "s1".into(),
                project: "proj".into(),
                tool_name: "Read".into(),
                tool_input: "{}".into(),
                tool_response: "{}".into(),
                cwd: "/tmp".into(),
                timestamp: 1_000,
                r#type: ObservationType::Read,
                title: "Read config".into(),
                subtitle: "loaded settings".into(),
                narrative: "read the settings file".into(),
                facts: vec![],
                concepts: vec!["intent:setup".into()],
                prompt_number: Some(1),
                files_read: vec!["settings.json".into()],
                files_modified: vec![],
                content_hash: "hash1".into(),
            })
            .unwrap();
        store
            .insert_user_prompt("s1", "proj", "please read the settings file", 900)
            .unwrap();
        store
            .insert_session_summary(NewSessionSummary {
                session_id: "s1".into(),
                project: "proj".into(),
                request: "read settings".into(),
                completed: "read settings.json".into(),
                files_read: vec!["settings.json".into()],
                files_modified: vec![],
                next_steps: "none".into(),
                notes: "".into(),
                decisions: vec![],
                errors: vec![],
                prompt_number: 1,
                created_at: 950,
            })
            .unwrap();
        store
    }

    #[test]
    fn wraps_document_in_tags() {
        let store = seeded_store();
        let config = ContextConfig::default();
        let doc = build_context(&store, "s1", &config, 2_000).unwrap();
        assert!(doc.starts_with(CONTEXT_TAG_OPEN));
        assert!(doc.trim_end().ends_with(CONTEXT_TAG_CLOSE));
    }

    #[test]
    fn disabling_sections_omits_their_headings() {
        let store = seeded_store();
        let mut config = ContextConfig::default();
        config.show_tool_guidance = false;
        config.show_prompts = false;
        let doc = build_context(&store, "s1", &config, 2_000).unwrap();
        assert!(!doc.contains("Tool Usage Guidance"));
        assert!(!doc.contains("Recent User Prompts"));
        assert!(doc.contains("Previous Session Summaries"));
        assert!(doc.contains("Recent Activity"));
    }

    #[test]
    fn footer_reports_token_estimate() {
        let store = seeded_store();
        let config = ContextConfig::default();
        let doc = build_context(&store, "s1", &config, 2_000).unwrap();
        assert!(doc.contains("tokens shown"));
    }
}
