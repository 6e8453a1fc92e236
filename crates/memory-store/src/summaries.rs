// crates/memory-store/src/summaries.rs
//! SessionSummary CRUD (spec §3).

use agentkits_memory_core::SessionSummary;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StoreResult;
use crate::json::{decode_list, encode_list};
use crate::store::Store;
use crate::vector::{decode_embedding, encode_embedding};

fn row_to_summary(row: &Row) -> rusqlite::Result<SessionSummary> {
    let files_read: String = row.get("files_read")?;
    let files_modified: String = row.get("files_modified")?;
    let decisions: String = row.get("decisions")?;
    let errors: String = row.get("errors")?;
    let embedding: Option<Vec<u8>> = row.get("embedding")?;
    Ok(SessionSummary {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        project: row.get("project")?,
        request: row.get("request")?,
        completed: row.get("completed")?,
        files_read: decode_list(&files_read),
        files_modified: decode_list(&files_modified),
        next_steps: row.get("next_steps")?,
        notes: row.get("notes")?,
        decisions: decode_list(&decisions),
        errors: decode_list(&errors),
        prompt_number: row.get::<_, i64>("prompt_number")? as u32,
        created_at: row.get::<_, i64>("created_at")? as u64,
        embedding: embedding.map(|b| decode_embedding(&b)),
    })
}

pub struct NewSessionSummary {
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
}

impl Store {
    pub fn insert_session_summary(&self, new: NewSessionSummary) -> StoreResult<SessionSummary> {
        self.connection().execute(
            "INSERT INTO session_summaries (
                session_id, project, request, completed, files_read, files_modified,
                next_steps, notes, decisions, errors, prompt_number, created_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            params![
                new.session_id,
                new.project,
                new.request,
                new.completed,
                encode_list(&new.files_read),
                encode_list(&new.files_modified),
                new.next_steps,
                new.notes,
                encode_list(&new.decisions),
                encode_list(&new.errors),
                new.prompt_number,
                new.created_at as i64,
            ],
        )?;
        let id = self.connection().last_insert_rowid();
        Ok(self.get_summary(id)?.expect("just inserted"))
    }

    pub fn get_summary(&self, id: i64) -> StoreResult<Option<SessionSummary>> {
        Ok(self
            .connection()
            .query_row("SELECT * FROM session_summaries WHERE id = ?1", [id], row_to_summary)
            .optional()?)
    }

    pub fn recent_summaries(&self, project: &str, limit: u32) -> StoreResult<Vec<SessionSummary>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM session_summaries WHERE project = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![project, limit], row_to_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn summaries_for_session(&self, session_id: &str) -> StoreResult<Vec<SessionSummary>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM session_summaries WHERE session_id = ?1 ORDER BY prompt_number ASC",
        )?;
        let rows = stmt
            .query_map([session_id], row_to_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Newest-first, capped — used by retrieval's session scan (spec §4.7).
    pub fn summaries_for_session_capped(&self, session_id: &str, cap: u32) -> StoreResult<Vec<SessionSummary>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM session_summaries WHERE session_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![session_id, cap], row_to_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn set_summary_embedding(&self, id: i64, embedding: &[f32]) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE session_summaries SET embedding = ?2 WHERE id = ?1",
            params![id, encode_embedding(embedding)],
        )?;
        Ok(())
    }

    pub fn summaries_without_embedding(&self, limit: u32) -> StoreResult<Vec<SessionSummary>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM session_summaries WHERE embedding IS NULL ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], row_to_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fill in `notes` and `next_steps` from an AI enrichment pass, in place.
    pub fn enrich_summary(&self, id: i64, notes: &str, next_steps: &str) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE session_summaries SET notes = ?2, next_steps = ?3 WHERE id = ?1",
            params![id, notes, next_steps],
        )?;
        Ok(())
    }
}
