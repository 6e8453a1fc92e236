// crates/memory-cli/src/transcript.rs
//! Reads a session transcript file to recover the assistant's final message
//! for the `enrich-summary` command (spec §6 Transcript file format: JSON
//! lines, newest entry last).

use std::path::Path;

use agentkits_memory_core::types::{truncate_payload, MAX_PAYLOAD_BYTES};
use serde_json::Value;

/// Strip `<system-reminder>...</system-reminder>`-shaped spans (and any
/// other `<...-reminder>` tag pair) a host may have injected into the
/// assistant's rendered message.
fn strip_system_reminders(text: &str) -> String {
    let mut result = text.to_string();
    loop {
        let Some(open_start) = result.find("<system-reminder") else {
            break;
        };
        let Some(open_end) = result[open_start..].find('>') else {
            break;
        };
        let open_end = open_start + open_end + 1;
        let Some(close_rel) = result[open_end..].find("</system-reminder>") else {
            result.replace_range(open_start..open_end, "");
            continue;
        };
        let close_end = open_end + close_rel + "</system-reminder>".len();
        result.replace_range(open_start..close_end, "");
    }
    result
}

fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(blocks) => {
            let text: String = blocks
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n");
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        _ => None,
    }
}

fn is_assistant_entry(entry: &Value) -> bool {
    entry.get("type").and_then(Value::as_str) == Some("assistant")
        || entry
            .get("message")
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
            == Some("assistant")
}

/// Scan `path` backwards for the most recent assistant message, returning
/// its text with injected system-reminder spans stripped and length capped
/// at `MAX_PAYLOAD_BYTES`. Returns `None` if the file is missing, empty, or
/// has no assistant entry — callers treat that as "no transcript available".
pub fn last_assistant_message(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;

    for line in raw.lines().rev() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(entry) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        if !is_assistant_entry(&entry) {
            continue;
        }
        let content = entry.get("message").and_then(|m| m.get("content")).or_else(|| entry.get("content"));
        if let Some(text) = content.and_then(content_text) {
            let cleaned = strip_system_reminders(&text);
            let trimmed = cleaned.trim();
            if !trimmed.is_empty() {
                return Some(truncate_payload(trimmed, MAX_PAYLOAD_BYTES));
            }
        }
    }
    None
}
