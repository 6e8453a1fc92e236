// crates/memory-retrieval/src/session_search.rs
//! Session-scoped retrieval across the four session tables (observations,
//! user_prompts, session_summaries, session_digests), each capped at the
//! newest `SESSION_SCAN_CAP` rows, merged into one heterogeneous ranked
//! list tagged by source table (spec §4.7).

use agentkits_memory_core::{Observation, SessionDigest, SessionSummary, UserPrompt};
use agentkits_memory_providers::EmbeddingProvider;
use agentkits_memory_store::vector::cosine_similarity;
use agentkits_memory_store::Store;

use crate::error::RetrievalResult;
use crate::ranked::{sort_ranked, RankedResult, SourceTable};
use crate::scoring::{fuse, keyword_score, sanitize_terms, FUSED_THRESHOLD, SESSION_SCAN_CAP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Text,
    Vector,
    Hybrid,
}

const PREVIEW_CHARS: usize = 200;

fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        text.chars().take(PREVIEW_CHARS).collect()
    }
}

fn observation_text(obs: &Observation) -> String {
    if let Some(summary) = &obs.compressed_summary {
        summary.clone()
    } else {
        format!("{} {} {} {}", obs.title, obs.subtitle, obs.narrative, obs.concepts.join(" "))
    }
}

fn summary_text(summary: &SessionSummary) -> String {
    format!(
        "{} {} {} {} {} {}",
        summary.request,
        summary.completed,
        summary.next_steps,
        summary.notes,
        summary.decisions.join(" "),
        summary.errors.join(" "),
    )
}

fn score_row(text: &str, embedding: Option<&[f32]>, terms: &[String], query_embedding: &[f32], mode: SearchMode) -> (f32, f32, f32) {
    let keyword = match mode {
        SearchMode::Vector => 0.0,
        _ => keyword_score(text, terms),
    };
    let semantic = match mode {
        SearchMode::Text => 0.0,
        _ => embedding.map(|e| cosine_similarity(query_embedding, e)).unwrap_or(0.0),
    };
    let fused = match mode {
        SearchMode::Text => keyword,
        SearchMode::Vector => semantic,
        SearchMode::Hybrid => fuse(keyword, semantic),
    };
    (keyword, semantic, fused)
}

/// Returns `true` if this row should be kept under `mode`'s threshold rule.
fn passes_threshold(mode: SearchMode, semantic: f32, fused: f32, has_embedding: bool) -> bool {
    match mode {
        SearchMode::Text => true,
        SearchMode::Vector => has_embedding && semantic >= crate::scoring::SEMANTIC_DROP_THRESHOLD,
        SearchMode::Hybrid => fused >= FUSED_THRESHOLD,
    }
}

pub fn session_search(
    store: &Store,
    session_id: &str,
    query: &str,
    embedder: &dyn EmbeddingProvider,
    mode: SearchMode,
    limit: u32,
) -> RetrievalResult<Vec<RankedResult>> {
    let terms = sanitize_terms(query);
    let query_embedding = if mode == SearchMode::Text { Vec::new() } else { embedder.embed(query) };
    let mut results = Vec::new();

    for obs in store.observations_for_session_capped(session_id, SESSION_SCAN_CAP)? {
        let text = observation_text(&obs);
        let embedding = obs.embedding.as_deref();
        let (keyword, semantic, fused) = score_row(&text, embedding, &terms, &query_embedding, mode);
        if passes_threshold(mode, semantic, fused, embedding.is_some()) {
            results.push(RankedResult {
                source: SourceTable::Observation,
                id: obs.id.clone(),
                preview: truncate_preview(&text),
                keyword_score: keyword,
                semantic_score: semantic,
                fused_score: fused,
            });
        }
    }

    for prompt in store.prompts_for_session_capped(session_id, SESSION_SCAN_CAP)? {
        let embedding = prompt.embedding.as_deref();
        let (keyword, semantic, fused) = score_row(&prompt.prompt_text, embedding, &terms, &query_embedding, mode);
        if passes_threshold(mode, semantic, fused, embedding.is_some()) {
            results.push(RankedResult {
                source: SourceTable::UserPrompt,
                id: prompt.id.to_string(),
                preview: truncate_preview(&prompt.prompt_text),
                keyword_score: keyword,
                semantic_score: semantic,
                fused_score: fused,
            });
        }
    }

    for summary in store.summaries_for_session_capped(session_id, SESSION_SCAN_CAP)? {
        let text = summary_text(&summary);
        let embedding = summary.embedding.as_deref();
        let (keyword, semantic, fused) = score_row(&text, embedding, &terms, &query_embedding, mode);
        if passes_threshold(mode, semantic, fused, embedding.is_some()) {
            results.push(RankedResult {
                source: SourceTable::SessionSummary,
                id: summary.id.to_string(),
                preview: truncate_preview(&text),
                keyword_score: keyword,
                semantic_score: semantic,
                fused_score: fused,
            });
        }
    }

    if let Some(digest) = store.get_session_digest(session_id)? {
        let embedding = digest.embedding.as_deref();
        let (keyword, semantic, fused) = score_row(&digest.digest, embedding, &terms, &query_embedding, mode);
        if passes_threshold(mode, semantic, fused, embedding.is_some()) {
            results.push(RankedResult {
                source: SourceTable::SessionDigest,
                id: digest.id.to_string(),
                preview: truncate_preview(&digest.digest),
                keyword_score: keyword,
                semantic_score: semantic,
                fused_score: fused,
            });
        }
    }

    let mut ranked = sort_ranked(results);
    ranked.truncate(limit as usize);
    Ok(ranked)
}
