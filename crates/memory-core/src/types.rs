// crates/memory-core/src/types.rs
//! The event model: Session → UserPrompt → Observation → SessionSummary →
//! SessionDigest, plus the TaskQueue row shape and the optional
//! first-class MemoryEntry. Field lists match spec §3 exactly.

use serde::{Deserialize, Serialize};

/// Session lifecycle state, per spec §3 invariant 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Archived,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            "archived" => Some(SessionStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub project: String,
    pub prompt: String,
    pub started_at: u64,
    pub ended_at: Option<u64>,
    pub observation_count: u64,
    pub summary: Option<String>,
    pub status: SessionStatus,
    pub parent_session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPrompt {
    pub id: i64,
    pub session_id: String,
    pub prompt_number: u32,
    pub prompt_text: String,
    pub content_hash: String,
    pub created_at: u64,
    pub embedding: Option<Vec<f32>>,
}

/// Observation "type", derived from tool name per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationType {
    Read,
    Write,
    Execute,
    Search,
    Other,
}

impl ObservationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationType::Read => "read",
            ObservationType::Write => "write",
            ObservationType::Execute => "execute",
            ObservationType::Search => "search",
            ObservationType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "read" => ObservationType::Read,
            "write" => ObservationType::Write,
            "execute" => ObservationType::Execute,
            "search" => ObservationType::Search,
            _ => ObservationType::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: String,
    pub session_id: String,
    pub project: String,
    pub tool_name: String,
    pub tool_input: String,
    pub tool_response: String,
    pub cwd: String,
    pub timestamp: u64,
    pub r#type: ObservationType,
    pub title: String,
    pub subtitle: String,
    pub narrative: String,
    pub facts: Vec<String>,
    pub concepts: Vec<String>,
    pub prompt_number: Option<u32>,
    pub files_read: Vec<String>,
    pub files_modified: Vec<String>,
    pub content_hash: String,
    pub compressed_summary: Option<String>,
    pub is_compressed: bool,
    pub embedding: Option<Vec<f32>>,
}

/// Truncate a tool payload to at most `limit` bytes, appending the
/// `"...[truncated]"` sentinel spec §3 requires. Operates on char
/// boundaries so the result is always valid UTF-8.
pub const TRUNCATION_SENTINEL: &str = "...[truncated]";
pub const MAX_PAYLOAD_BYTES: usize = 5000;

pub fn truncate_payload(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let budget = limit.saturating_sub(TRUNCATION_SENTINEL.len());
    let mut end = budget.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &text[..end], TRUNCATION_SENTINEL)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub session_id: String,
    pub project: String,
    pub request: String,
    pub completed: String,
    pub files_read: Vec<String>,
    pub files_modified: Vec<String>,
    pub next_steps: String,
    pub notes: String,
    pub decisions: Vec<String>,
    pub errors: Vec<String>,
    pub prompt_number: u32,
    pub created_at: u64,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDigest {
    pub id: i64,
    pub session_id: String,
    pub project: String,
    pub digest: String,
    pub observation_count: u64,
    pub created_at: u64,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Embed,
    Enrich,
    Compress,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Embed => "embed",
            TaskType::Enrich => "enrich",
            TaskType::Compress => "compress",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "embed" => Some(TaskType::Embed),
            "enrich" => Some(TaskType::Enrich),
            "compress" => Some(TaskType::Compress),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "processing" => Some(TaskStatus::Processing),
            "failed" => Some(TaskStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQueueRow {
    pub id: i64,
    pub task_type: TaskType,
    pub target_table: String,
    pub target_id: String,
    pub created_at: u64,
    pub status: TaskStatus,
    pub retry_count: u32,
}

/// `MemoryEntries` per spec §3: the first-class, agent-facing "save a
/// fact" table. Populated outside the hot ingestion path; consumed by
/// retrieval like any other source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryEntryType {
    Semantic,
    Episodic,
    Procedural,
    Working,
    Cache,
}

impl MemoryEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryEntryType::Semantic => "semantic",
            MemoryEntryType::Episodic => "episodic",
            MemoryEntryType::Procedural => "procedural",
            MemoryEntryType::Working => "working",
            MemoryEntryType::Cache => "cache",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "episodic" => MemoryEntryType::Episodic,
            "procedural" => MemoryEntryType::Procedural,
            "working" => MemoryEntryType::Working,
            "cache" => MemoryEntryType::Cache,
            _ => MemoryEntryType::Semantic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: i64,
    pub key: String,
    pub content: String,
    pub r#type: MemoryEntryType,
    pub namespace: String,
    pub tags: Vec<String>,
    pub metadata: serde_json::Value,
    pub embedding: Option<Vec<f32>>,
    pub access_count: u64,
    pub last_accessed_at: Option<u64>,
    pub version: u32,
    /// Unconsumed by retrieval per spec §9's Open Questions — preserved
    /// for round-trip only.
    pub importance: f32,
    /// Unconsumed by retrieval per spec §9's Open Questions — preserved
    /// for round-trip only.
    pub decay: f32,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_text_is_unchanged() {
        assert_eq!(truncate_payload("hello", 100), "hello");
    }

    #[test]
    fn truncate_long_text_adds_sentinel_and_stays_under_limit() {
        let long = "x".repeat(10_000);
        let truncated = truncate_payload(&long, MAX_PAYLOAD_BYTES);
        assert!(truncated.len() < 100_000);
        assert!(truncated.ends_with(TRUNCATION_SENTINEL));
        assert!(truncated.len() <= MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "a".repeat(10).to_string() + "日本語のテキストです".repeat(50).as_str();
        let truncated = truncate_payload(&text, 30);
        assert!(String::from_utf8(truncated.clone().into_bytes()).is_ok());
        assert!(truncated.ends_with(TRUNCATION_SENTINEL));
    }

    #[test]
    fn session_status_round_trips() {
        for s in [SessionStatus::Active, SessionStatus::Completed, SessionStatus::Archived] {
            assert_eq!(SessionStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn task_status_monotonic_terminal_is_failed_or_absent() {
        assert_eq!(TaskStatus::parse("failed"), Some(TaskStatus::Failed));
        assert_eq!(TaskStatus::parse("bogus"), None);
    }
}
