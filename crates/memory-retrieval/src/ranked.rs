// crates/memory-retrieval/src/ranked.rs
//! The heterogeneous ranked-result shape shared by every retrieval mode.

/// Which table a `RankedResult` was sourced from (spec §4.7: "a
/// heterogeneous ranked list tagged by source table").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTable {
    Observation,
    UserPrompt,
    SessionSummary,
    SessionDigest,
    MemoryEntry,
}

impl SourceTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTable::Observation => "observations",
            SourceTable::UserPrompt => "user_prompts",
            SourceTable::SessionSummary => "session_summaries",
            SourceTable::SessionDigest => "session_digests",
            SourceTable::MemoryEntry => "memory_entries",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankedResult {
    pub source: SourceTable,
    pub id: String,
    pub preview: String,
    pub keyword_score: f32,
    pub semantic_score: f32,
    pub fused_score: f32,
}

/// Sort a result set descending by `fused_score`, ties broken by id for
/// determinism.
pub fn sort_ranked(mut results: Vec<RankedResult>) -> Vec<RankedResult> {
    results.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    results
}
