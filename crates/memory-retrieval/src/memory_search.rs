// crates/memory-retrieval/src/memory_search.rs
//! Text, vector, and hybrid search over `memory_entries` — the first-class
//! "save a fact" table (spec §4.7).

use std::collections::HashMap;

use agentkits_memory_core::MemoryEntry;
use agentkits_memory_providers::EmbeddingProvider;
use agentkits_memory_store::vector::cosine_similarity;
use agentkits_memory_store::Store;

use crate::error::RetrievalResult;
use crate::ranked::{sort_ranked, RankedResult, SourceTable};
use crate::scoring::{build_fts_query, fuse, keyword_score, sanitize_terms, FUSED_THRESHOLD, SEMANTIC_DROP_THRESHOLD};

const PREVIEW_CHARS: usize = 200;

fn preview(entry: &MemoryEntry) -> String {
    let content = &entry.content;
    if content.chars().count() <= PREVIEW_CHARS {
        content.clone()
    } else {
        content.chars().take(PREVIEW_CHARS).collect()
    }
}

fn searchable_text(entry: &MemoryEntry) -> String {
    format!("{} {} {}", entry.key, entry.content, entry.tags.join(" "))
}

/// FTS5-BM25 when the index matches, else a `LIKE` fallback — both scored
/// with the same substring-distance keyword heuristic (spec §4.7).
fn text_candidates(store: &Store, query: &str, limit: u32) -> RetrievalResult<Vec<(MemoryEntry, f32)>> {
    let terms = sanitize_terms(query);
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let fts_query = build_fts_query(&terms);
    let entries = match store.fts_search_memory_entries(&fts_query, limit) {
        Ok(matches) if !matches.is_empty() => matches.into_iter().map(|(entry, _bm25)| entry).collect(),
        _ => store.like_search_memory_entries(&terms.join(" "), limit)?,
    };

    Ok(entries
        .into_iter()
        .map(|entry| {
            let score = keyword_score(&searchable_text(&entry), &terms);
            (entry, score)
        })
        .collect())
}

fn vector_candidates(store: &Store, query_embedding: &[f32], limit: u32) -> RetrievalResult<Vec<(MemoryEntry, f32)>> {
    let entries = store.memory_entries_with_embedding(limit)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let embedding = entry.embedding.as_deref()?;
            let similarity = cosine_similarity(query_embedding, embedding);
            (similarity >= SEMANTIC_DROP_THRESHOLD).then_some((entry, similarity))
        })
        .collect())
}

pub fn text_search(store: &Store, query: &str, limit: u32) -> RetrievalResult<Vec<RankedResult>> {
    let results = text_candidates(store, query, limit)?
        .into_iter()
        .map(|(entry, score)| RankedResult {
            source: SourceTable::MemoryEntry,
            id: entry.id.to_string(),
            preview: preview(&entry),
            keyword_score: score,
            semantic_score: 0.0,
            fused_score: score,
        })
        .collect();
    Ok(sort_ranked(results))
}

pub fn vector_search(store: &Store, query_embedding: &[f32], limit: u32) -> RetrievalResult<Vec<RankedResult>> {
    let results = vector_candidates(store, query_embedding, limit)?
        .into_iter()
        .map(|(entry, similarity)| RankedResult {
            source: SourceTable::MemoryEntry,
            id: entry.id.to_string(),
            preview: preview(&entry),
            keyword_score: 0.0,
            semantic_score: similarity,
            fused_score: similarity,
        })
        .collect();
    Ok(sort_ranked(results))
}

pub fn hybrid_search(store: &Store, query: &str, embedder: &dyn EmbeddingProvider, limit: u32) -> RetrievalResult<Vec<RankedResult>> {
    let query_embedding = embedder.embed(query);

    let mut merged: HashMap<i64, (String, f32, f32)> = HashMap::new();

    for (entry, score) in text_candidates(store, query, limit)? {
        let entry_preview = preview(&entry);
        merged.entry(entry.id).or_insert((entry_preview, 0.0, 0.0)).1 = score;
    }
    for (entry, similarity) in vector_candidates(store, &query_embedding, limit)? {
        let entry_preview = preview(&entry);
        let slot = merged.entry(entry.id).or_insert((entry_preview, 0.0, 0.0));
        slot.2 = similarity;
    }

    let results = merged
        .into_iter()
        .filter_map(|(id, (entry_preview, keyword, semantic))| {
            let fused = fuse(keyword, semantic);
            (fused >= FUSED_THRESHOLD).then_some(RankedResult {
                source: SourceTable::MemoryEntry,
                id: id.to_string(),
                preview: entry_preview,
                keyword_score: keyword,
                semantic_score: semantic,
                fused_score: fused,
            })
        })
        .collect();

    Ok(sort_ranked(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkits_memory_core::MemoryEntryType;
    use agentkits_memory_providers::LocalEmbeddingProvider;
    use agentkits_memory_store::NewMemoryEntry;

    fn seed(store: &Store, key: &str, content: &str) {
        store
            .insert_memory_entry(NewMemoryEntry {
                key: key.to_string(),
                content: content.to_string(),
                r#type: MemoryEntryType::Semantic,
                namespace: "default".into(),
                tags: vec![],
                metadata: serde_json::Value::Null,
                importance: 0.5,
                decay: 0.0,
                created_at: 1000,
            })
            .unwrap();
    }

    #[test]
    fn text_search_finds_substring_match() {
        let store = Store::open_in_memory().unwrap();
        seed(&store, "db-choice", "the project uses sqlite for storage");
        let results = text_search(&store, "sqlite", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].keyword_score >= 0.3);
    }

    #[test]
    fn vector_search_drops_low_similarity() {
        let store = Store::open_in_memory().unwrap();
        let embedder = LocalEmbeddingProvider::default();
        let entry = store
            .insert_memory_entry(NewMemoryEntry {
                key: "k".into(),
                content: "completely unrelated filler text".into(),
                r#type: MemoryEntryType::Semantic,
                namespace: "default".into(),
                tags: vec![],
                metadata: serde_json::Value::Null,
                importance: 0.5,
                decay: 0.0,
                created_at: 1000,
            })
            .unwrap();
        store.set_memory_entry_embedding(entry.id, &embedder.embed("completely unrelated filler text")).unwrap();

        let query_embedding = embedder.embed("something else entirely different zzz");
        let results = vector_search(&store, &query_embedding, 10).unwrap();
        assert!(results.is_empty() || results[0].semantic_score >= SEMANTIC_DROP_THRESHOLD);
    }

    #[test]
    fn hybrid_search_fuses_keyword_and_semantic() {
        let store = Store::open_in_memory().unwrap();
        let embedder = LocalEmbeddingProvider::default();
        let entry = store
            .insert_memory_entry(NewMemoryEntry {
                key: "k".into(),
                content: "rust async runtime tokio".into(),
                r#type: MemoryEntryType::Semantic,
                namespace: "default".into(),
                tags: vec![],
                metadata: serde_json::Value::Null,
                importance: 0.5,
                decay: 0.0,
                created_at: 1000,
            })
            .unwrap();
        store.set_memory_entry_embedding(entry.id, &embedder.embed("rust async runtime tokio")).unwrap();

        let results = hybrid_search(&store, "rust async runtime tokio", &embedder, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].fused_score > 0.0);
    }
}
