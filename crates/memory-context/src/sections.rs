// crates/memory-context/src/sections.rs
//! Renders the five markdown sections spec §4.7 describes, each gated by
//! its own `ContextConfig` toggle.

use std::collections::BTreeMap;

use agentkits_memory_core::time::relative_time;
use agentkits_memory_core::{Observation, ObservationType, SessionSummary, UserPrompt};

const PROMPT_PREVIEW_CHARS: usize = 300;

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

pub fn tool_usage_guidance() -> String {
    "## Tool Usage Guidance\n\n\
     This project has accumulated memory from prior sessions. Prefer the \
     progressive-disclosure workflow over re-reading everything below:\n\
     1. `search` — find candidate observations, prompts, or summaries by keyword or meaning.\n\
     2. `timeline` — see a session's activity in order once you know which session matters.\n\
     3. `details` — fetch one observation's full (uncompressed) payload only when you need it.\n"
        .to_string()
}

pub fn render_summaries(summaries: &[SessionSummary]) -> String {
    if summaries.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Previous Session Summaries\n\n");
    for summary in summaries {
        out.push_str(&format!("### Session {} (prompt #{})\n", summary.session_id, summary.prompt_number));
        out.push_str(&format!("- Request: {}\n", summary.request));
        out.push_str(&format!("- Completed: {}\n", summary.completed));
        if !summary.files_modified.is_empty() {
            out.push_str(&format!("- Files modified: {}\n", summary.files_modified.join(", ")));
        }
        if !summary.decisions.is_empty() {
            out.push_str(&format!("- Decisions: {}\n", summary.decisions.join("; ")));
        }
        if !summary.errors.is_empty() {
            out.push_str(&format!("- Errors: {}\n", summary.errors.join("; ")));
        }
        if !summary.next_steps.is_empty() {
            out.push_str(&format!("- Next steps: {}\n", summary.next_steps));
        }
        out.push('\n');
    }
    out
}

pub fn render_prompts(prompts: &[UserPrompt]) -> String {
    if prompts.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Recent User Prompts\n\n");
    for prompt in prompts {
        out.push_str(&format!("- #{}: {}\n", prompt.prompt_number, truncate_chars(&prompt.prompt_text, PROMPT_PREVIEW_CHARS)));
    }
    out.push('\n');
    out
}

fn observation_icon(kind: ObservationType) -> &'static str {
    match kind {
        ObservationType::Read => "📖",
        ObservationType::Write => "✍️",
        ObservationType::Execute => "⚡",
        ObservationType::Search => "🔎",
        ObservationType::Other => "•",
    }
}

/// The label fallback chain spec §4.7 calls "compressed summary (or
/// subtitle/title/tool name fallback)".
fn observation_label(obs: &Observation) -> &str {
    if let Some(summary) = &obs.compressed_summary {
        if !summary.is_empty() {
            return summary;
        }
    }
    if !obs.subtitle.is_empty() {
        return &obs.subtitle;
    }
    if !obs.title.is_empty() {
        return &obs.title;
    }
    &obs.tool_name
}

fn intent_concepts(obs: &Observation) -> Vec<&str> {
    obs.concepts.iter().filter(|c| c.starts_with("intent:")).map(String::as_str).collect()
}

fn render_observation_line(obs: &Observation, now_ms: u64) -> String {
    let icon = observation_icon(obs.r#type);
    let label = observation_label(obs);
    let when = relative_time(obs.timestamp, now_ms);
    let intents = intent_concepts(obs);
    if intents.is_empty() {
        format!("- {icon} {label} ({when}, `{}`)\n", obs.id)
    } else {
        format!("- {icon} {label} [{}] ({when}, `{}`)\n", intents.join(", "), obs.id)
    }
}

/// Groups observations under a `Prompt N` heading when `prompt_number` is
/// known; observations without one fall into a flat trailing bullet list
/// (spec §4.7).
pub fn render_activity(observations: &[Observation], now_ms: u64) -> String {
    if observations.is_empty() {
        return String::new();
    }
    // Oldest first within the capped recent window so the narrative reads
    // in chronological order.
    let mut ordered: Vec<&Observation> = observations.iter().collect();
    ordered.sort_by_key(|o| o.timestamp);

    let mut grouped: BTreeMap<u32, Vec<&Observation>> = BTreeMap::new();
    let mut ungrouped: Vec<&Observation> = Vec::new();
    for obs in ordered {
        match obs.prompt_number {
            Some(n) => grouped.entry(n).or_default().push(obs),
            None => ungrouped.push(obs),
        }
    }

    let mut out = String::from("## Recent Activity\n\n");
    for (prompt_number, obs_list) in grouped {
        out.push_str(&format!("### Prompt #{prompt_number}\n"));
        for obs in obs_list {
            out.push_str(&render_observation_line(obs, now_ms));
        }
        out.push('\n');
    }
    if !ungrouped.is_empty() {
        for obs in ungrouped {
            out.push_str(&render_observation_line(obs, now_ms));
        }
        out.push('\n');
    }
    out
}

pub fn render_footer(shown_tokens: usize, budget_tokens: usize) -> String {
    format!("---\n_Context size: ~{shown_tokens} tokens shown of a ~{budget_tokens} token budget._\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkits_memory_core::ObservationType;

    fn obs(id: &str, timestamp: u64, prompt_number: Option<u32>) -> Observation {
        Observation {
            id: id.to_string(),
            session_id: "s1".into(),
            project: "proj".into(),
            tool_name: "Read".into(),
            tool_input: "{}".into(),
            tool_response: "{}".into(),
            cwd: "/tmp".into(),
            timestamp,
            r#type: ObservationType::Read,
            title: "title".into(),
            subtitle: "subtitle".into(),
            narrative: "narrative".into(),
            facts: vec![],
            concepts: vec!["intent:debugging".into()],
            prompt_number,
            files_read: vec![],
            files_modified: vec![],
            content_hash: "h".into(),
            compressed_summary: None,
            is_compressed: false,
            embedding: None,
        }
    }

    #[test]
    fn empty_sections_render_nothing() {
        assert_eq!(render_summaries(&[]), "");
        assert_eq!(render_prompts(&[]), "");
        assert_eq!(render_activity(&[], 0), "");
    }

    #[test]
    fn activity_groups_by_prompt_number() {
        let observations = vec![obs("a", 1000, Some(1)), obs("b", 2000, Some(1)), obs("c", 3000, None)];
        let rendered = render_activity(&observations, 3000);
        assert!(rendered.contains("### Prompt #1"));
        assert!(rendered.contains("`a`"));
        assert!(rendered.contains("`b`"));
        assert!(rendered.contains("`c`"));
    }

    #[test]
    fn activity_line_includes_intent_concepts_and_icon() {
        let observations = vec![obs("a", 1000, None)];
        let rendered = render_activity(&observations, 1000);
        assert!(rendered.contains("📖"));
        assert!(rendered.contains("intent:debugging"));
    }

    #[test]
    fn observation_label_falls_back_through_chain() {
        let mut o = obs("a", 1000, None);
        o.subtitle = String::new();
        o.title = String::new();
        o.tool_name = "Bash".into();
        assert_eq!(observation_label(&o), "Bash");
    }
}
