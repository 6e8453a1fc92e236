// crates/memory-store/src/memory_entries.rs
//! MemoryEntry CRUD, the first-class "save a fact" table the FTS5 trigram
//! index is defined over (spec §3, SPEC_FULL.md §3).

use agentkits_memory_core::hash::memory_entry_hash;
use agentkits_memory_core::{MemoryEntry, MemoryEntryType};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StoreResult;
use crate::json::{decode_list, encode_list};
use crate::store::Store;
use crate::vector::{decode_embedding, encode_embedding};

fn row_to_entry(row: &Row) -> rusqlite::Result<MemoryEntry> {
    let type_str: String = row.get("type")?;
    let tags: String = row.get("tags")?;
    let metadata: String = row.get("metadata")?;
    let embedding: Option<Vec<u8>> = row.get("embedding")?;
    Ok(MemoryEntry {
        id: row.get("id")?,
        key: row.get("key")?,
        content: row.get("content")?,
        r#type: MemoryEntryType::parse(&type_str),
        namespace: row.get("namespace")?,
        tags: decode_list(&tags),
        metadata: serde_json::from_str(&metadata).unwrap_or(serde_json::Value::Null),
        embedding: embedding.map(|b| decode_embedding(&b)),
        access_count: row.get::<_, i64>("access_count")? as u64,
        last_accessed_at: row.get::<_, Option<i64>>("last_accessed_at")?.map(|v| v as u64),
        version: row.get::<_, i64>("version")? as u32,
        importance: row.get("importance")?,
        decay: row.get("decay")?,
        created_at: row.get::<_, i64>("created_at")? as u64,
    })
}

pub struct NewMemoryEntry {
    pub key: String,
    pub content: String,
    pub r#type: MemoryEntryType,
    pub namespace: String,
    pub tags: Vec<String>,
    pub metadata: serde_json::Value,
    pub importance: f32,
    pub decay: f32,
    pub created_at: u64,
}

impl Store {
    /// Insert a memory entry, or return the existing row for an identical
    /// `(namespace, key, content)` hash — no time window, since spec leaves
    /// memory-entry dedup semantics open beyond "content-hash based".
    pub fn insert_memory_entry(&self, new: NewMemoryEntry) -> StoreResult<MemoryEntry> {
        let hash = memory_entry_hash(&new.namespace, &new.key, &new.content);

        let existing_id: Option<i64> = self
            .connection()
            .query_row(
                "SELECT id FROM memory_entries WHERE content_hash = ?1",
                [&hash],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing_id {
            return Ok(self.get_memory_entry(id)?.expect("just looked up"));
        }

        self.connection().execute(
            "INSERT INTO memory_entries (
                key, content, type, namespace, tags, metadata, access_count,
                version, importance, decay, created_at, content_hash
             ) VALUES (?1,?2,?3,?4,?5,?6,0,1,?7,?8,?9,?10)",
            params![
                new.key,
                new.content,
                new.r#type.as_str(),
                new.namespace,
                encode_list(&new.tags),
                new.metadata.to_string(),
                new.importance,
                new.decay,
                new.created_at as i64,
                hash,
            ],
        )?;
        let id = self.connection().last_insert_rowid();
        Ok(self.get_memory_entry(id)?.expect("just inserted"))
    }

    pub fn get_memory_entry(&self, id: i64) -> StoreResult<Option<MemoryEntry>> {
        Ok(self
            .connection()
            .query_row("SELECT * FROM memory_entries WHERE id = ?1", [id], row_to_entry)
            .optional()?)
    }

    pub fn touch_memory_entry_access(&self, id: i64, now_ms: u64) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE memory_entries SET access_count = access_count + 1, last_accessed_at = ?2 WHERE id = ?1",
            params![id, now_ms as i64],
        )?;
        Ok(())
    }

    pub fn set_memory_entry_embedding(&self, id: i64, embedding: &[f32]) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE memory_entries SET embedding = ?2 WHERE id = ?1",
            params![id, encode_embedding(embedding)],
        )?;
        Ok(())
    }

    pub fn memory_entries_without_embedding(&self, limit: u32) -> StoreResult<Vec<MemoryEntry>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM memory_entries WHERE embedding IS NULL ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// All memory entries that carry an embedding, for brute-force cosine
    /// scanning when the vector extension is unavailable (spec §4.1).
    pub fn memory_entries_with_embedding(&self, limit: u32) -> StoreResult<Vec<MemoryEntry>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM memory_entries WHERE embedding IS NOT NULL ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// BM25-ranked FTS5 match over the trigram index; `fts_query` is already
    /// sanitized/quoted terms joined with `OR` (spec §4.7). Returns
    /// `(entry, bm25_score)` pairs, lower score is better.
    pub fn fts_search_memory_entries(&self, fts_query: &str, limit: u32) -> StoreResult<Vec<(MemoryEntry, f64)>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT m.*, bm25(memory_entries_fts) AS score
             FROM memory_entries_fts
             JOIN memory_entries m ON m.id = memory_entries_fts.rowid
             WHERE memory_entries_fts MATCH ?1
             ORDER BY score LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![fts_query, limit], |row| {
                Ok((row_to_entry(row)?, row.get::<_, f64>("score")?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Plain substring fallback when FTS5 MATCH fails or isn't applicable.
    pub fn like_search_memory_entries(&self, term: &str, limit: u32) -> StoreResult<Vec<MemoryEntry>> {
        let pattern = format!("%{term}%");
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM memory_entries
             WHERE key LIKE ?1 OR content LIKE ?1 OR tags LIKE ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![pattern, limit], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
