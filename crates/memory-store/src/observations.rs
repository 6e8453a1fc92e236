// crates/memory-store/src/observations.rs
//! Observation CRUD: content-hash dedup within a session, enrichment and
//! compression writers, catch-up queries for the Embed/Compress workers.

use agentkits_memory_core::queue_constants::OBSERVATION_DEDUP_WINDOW_MS;
use agentkits_memory_core::{Observation, ObservationType};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StoreResult;
use crate::json::{decode_list, encode_list};
use crate::store::Store;
use crate::vector::{decode_embedding, encode_embedding};

fn row_to_observation(row: &Row) -> rusqlite::Result<Observation> {
    let type_str: String = row.get("type")?;
    let facts: String = row.get("facts")?;
    let concepts: String = row.get("concepts")?;
    let files_read: String = row.get("files_read")?;
    let files_modified: String = row.get("files_modified")?;
    let embedding: Option<Vec<u8>> = row.get("embedding")?;
    Ok(Observation {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        project: row.get("project")?,
        tool_name: row.get("tool_name")?,
        tool_input: row.get("tool_input")?,
        tool_response: row.get("tool_response")?,
        cwd: row.get("cwd")?,
        timestamp: row.get::<_, i64>("timestamp")? as u64,
        r#type: ObservationType::parse(&type_str),
        title: row.get("title")?,
        subtitle: row.get("subtitle")?,
        narrative: row.get("narrative")?,
        facts: decode_list(&facts),
        concepts: decode_list(&concepts),
        prompt_number: row.get::<_, Option<i64>>("prompt_number")?.map(|v| v as u32),
        files_read: decode_list(&files_read),
        files_modified: decode_list(&files_modified),
        content_hash: row.get("content_hash")?,
        compressed_summary: row.get("compressed_summary")?,
        is_compressed: row.get::<_, i64>("is_compressed")? != 0,
        embedding: embedding.map(|b| decode_embedding(&b)),
    })
}

/// Everything `insert_observation` needs besides session/project, kept as
/// one struct so the handler layer builds it once from derivation output.
pub struct NewObservation {
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
}

impl Store {
    /// Insert an observation, or return the existing row if the same
    /// `content_hash` was recorded in this session within the dedup window.
    pub fn insert_observation(&self, new: NewObservation) -> StoreResult<Observation> {
        let cutoff = new.timestamp.saturating_sub(OBSERVATION_DEDUP_WINDOW_MS) as i64;
        let existing_id: Option<String> = self
            .connection()
            .query_row(
                "SELECT id FROM observations
                 WHERE session_id = ?1 AND content_hash = ?2 AND timestamp >= ?3
                 ORDER BY timestamp DESC LIMIT 1",
                params![new.session_id, new.content_hash, cutoff],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing_id {
            return Ok(self.get_observation(&id)?.expect("just looked up"));
        }

        self.connection().execute(
            "INSERT INTO observations (
                id, session_id, project, tool_name, tool_input, tool_response, cwd, timestamp,
                type, title, subtitle, narrative, facts, concepts, prompt_number,
                files_read, files_modified, content_hash, is_compressed
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,0)",
            params![
                new.id,
                new.session_id,
                new.project,
                new.tool_name,
                new.tool_input,
                new.tool_response,
                new.cwd,
                new.timestamp as i64,
                new.r#type.as_str(),
                new.title,
                new.subtitle,
                new.narrative,
                encode_list(&new.facts),
                encode_list(&new.concepts),
                new.prompt_number,
                encode_list(&new.files_read),
                encode_list(&new.files_modified),
                new.content_hash,
            ],
        )?;

        self.increment_observation_count(&new.session_id)?;
        Ok(self.get_observation(&new.id)?.expect("just inserted"))
    }

    /// Insert a previously-exported observation verbatim, preserving its
    /// `id`, `compressed_summary`, and `is_compressed` flag. Bypasses the
    /// session+timestamp dedup window `insert_observation` applies, since
    /// the lifecycle import already dedupes against the target database
    /// before calling this (spec §4.8).
    pub fn insert_observation_import(&self, obs: &Observation) -> StoreResult<()> {
        self.connection().execute(
            "INSERT INTO observations (
                id, session_id, project, tool_name, tool_input, tool_response, cwd, timestamp,
                type, title, subtitle, narrative, facts, concepts, prompt_number,
                files_read, files_modified, content_hash, compressed_summary, is_compressed
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
            params![
                obs.id,
                obs.session_id,
                obs.project,
                obs.tool_name,
                obs.tool_input,
                obs.tool_response,
                obs.cwd,
                obs.timestamp as i64,
                obs.r#type.as_str(),
                obs.title,
                obs.subtitle,
                obs.narrative,
                encode_list(&obs.facts),
                encode_list(&obs.concepts),
                obs.prompt_number,
                encode_list(&obs.files_read),
                encode_list(&obs.files_modified),
                obs.content_hash,
                obs.compressed_summary,
                obs.is_compressed as i64,
            ],
        )?;
        self.increment_observation_count(&obs.session_id)?;
        Ok(())
    }

    pub fn get_observation(&self, id: &str) -> StoreResult<Option<Observation>> {
        Ok(self
            .connection()
            .query_row("SELECT * FROM observations WHERE id = ?1", [id], row_to_observation)
            .optional()?)
    }

    pub fn observations_for_session(&self, session_id: &str) -> StoreResult<Vec<Observation>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM observations WHERE session_id = ?1 ORDER BY timestamp ASC",
        )?;
        let rows = stmt
            .query_map([session_id], row_to_observation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Newest-first, capped — used by retrieval's session scan (spec §4.7:
    /// "scans up to 2000 newest rows per session table").
    pub fn observations_for_session_capped(&self, session_id: &str, cap: u32) -> StoreResult<Vec<Observation>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM observations WHERE session_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![session_id, cap], row_to_observation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn recent_observations(&self, project: &str, limit: u32) -> StoreResult<Vec<Observation>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM observations WHERE project = ?1 ORDER BY timestamp DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![project, limit], row_to_observation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn set_observation_embedding(&self, id: &str, embedding: &[f32]) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE observations SET embedding = ?2 WHERE id = ?1",
            params![id, encode_embedding(embedding)],
        )?;
        Ok(())
    }

    pub fn observations_without_embedding(&self, limit: u32) -> StoreResult<Vec<Observation>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM observations WHERE embedding IS NULL ORDER BY timestamp DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], row_to_observation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Overwrite an observation's template-derived fields with AI-enriched
    /// ones (spec §4.5 Enrich).
    pub fn enrich_observation(
        &self,
        id: &str,
        subtitle: &str,
        narrative: &str,
        facts: &[String],
        concepts: &[String],
    ) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE observations SET subtitle = ?2, narrative = ?3, facts = ?4, concepts = ?5 WHERE id = ?1",
            params![id, subtitle, narrative, encode_list(facts), encode_list(concepts)],
        )?;
        Ok(())
    }

    /// Compress one observation in place: raw payloads are destroyed
    /// (irreversible, spec §3 invariant 3).
    pub fn compress_observation(&self, id: &str, compressed_summary: &str) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE observations SET compressed_summary = ?2, is_compressed = 1, tool_input = '{}', tool_response = '{}' WHERE id = ?1",
            params![id, compressed_summary],
        )?;
        Ok(())
    }

    pub fn uncompressed_observations_older_than(&self, cutoff_ms: u64, limit: u32) -> StoreResult<Vec<Observation>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM observations WHERE is_compressed = 0 AND timestamp < ?1 ORDER BY timestamp ASC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![cutoff_ms as i64, limit], row_to_observation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_observations_by_compression(&self) -> StoreResult<(u64, u64)> {
        let conn = self.connection();
        let compressed: i64 = conn.query_row(
            "SELECT COUNT(*) FROM observations WHERE is_compressed = 1",
            [],
            |row| row.get(0),
        )?;
        let uncompressed: i64 = conn.query_row(
            "SELECT COUNT(*) FROM observations WHERE is_compressed = 0",
            [],
            |row| row.get(0),
        )?;
        Ok((compressed as u64, uncompressed as u64))
    }
}
