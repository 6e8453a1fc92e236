// crates/memory-store/src/prompts.rs
//! UserPrompt CRUD with content-hash dedup (spec §3, §4.3).

use agentkits_memory_core::hash::prompt_hash;
use agentkits_memory_core::queue_constants::PROMPT_DEDUP_WINDOW_MS;
use agentkits_memory_core::UserPrompt;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StoreResult;
use crate::store::Store;
use crate::vector::{decode_embedding, encode_embedding};

fn row_to_prompt(row: &Row) -> rusqlite::Result<UserPrompt> {
    let embedding: Option<Vec<u8>> = row.get("embedding")?;
    Ok(UserPrompt {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        prompt_number: row.get::<_, i64>("prompt_number")? as u32,
        prompt_text: row.get("prompt_text")?,
        content_hash: row.get("content_hash")?,
        created_at: row.get::<_, i64>("created_at")? as u64,
        embedding: embedding.map(|b| decode_embedding(&b)),
    })
}

impl Store {
    pub fn next_prompt_number(&self, session_id: &str) -> StoreResult<u32> {
        let max: Option<i64> = self.connection().query_row(
            "SELECT MAX(prompt_number) FROM user_prompts WHERE session_id = ?1",
            [session_id],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) as u32 + 1)
    }

    /// Insert a user prompt, or return the existing row if an identical
    /// `(project, prompt_text)` hash was recorded within the dedup window.
    pub fn insert_user_prompt(
        &self,
        session_id: &str,
        project: &str,
        prompt_text: &str,
        now_ms: u64,
    ) -> StoreResult<UserPrompt> {
        let hash = prompt_hash(project, prompt_text);
        let cutoff = now_ms.saturating_sub(PROMPT_DEDUP_WINDOW_MS) as i64;

        let existing_id: Option<i64> = self
            .connection()
            .query_row(
                "SELECT up.id FROM user_prompts up
                 JOIN sessions s ON s.session_id = up.session_id
                 WHERE up.content_hash = ?1 AND s.project = ?2 AND up.created_at >= ?3
                 ORDER BY up.created_at DESC LIMIT 1",
                params![hash, project, cutoff],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing_id {
            return Ok(self.get_prompt(id)?.expect("just looked up"));
        }

        let prompt_number = self.next_prompt_number(session_id)?;
        self.connection().execute(
            "INSERT INTO user_prompts (session_id, prompt_number, prompt_text, content_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, prompt_number, prompt_text, hash, now_ms as i64],
        )?;
        let id = self.connection().last_insert_rowid();
        Ok(self.get_prompt(id)?.expect("just inserted"))
    }

    /// Insert a previously-exported prompt verbatim under a (possibly
    /// remapped) `session_id`, preserving `prompt_number` and `content_hash`.
    /// The lifecycle import dedupes before calling this, so no window check
    /// runs here (spec §4.8).
    pub fn insert_user_prompt_import(
        &self,
        session_id: &str,
        prompt_number: u32,
        prompt_text: &str,
        content_hash: &str,
        created_at: u64,
    ) -> StoreResult<()> {
        self.connection().execute(
            "INSERT INTO user_prompts (session_id, prompt_number, prompt_text, content_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, prompt_number, prompt_text, content_hash, created_at as i64],
        )?;
        Ok(())
    }

    pub fn get_prompt(&self, id: i64) -> StoreResult<Option<UserPrompt>> {
        Ok(self
            .connection()
            .query_row("SELECT * FROM user_prompts WHERE id = ?1", [id], row_to_prompt)
            .optional()?)
    }

    pub fn recent_prompts(&self, project: &str, limit: u32) -> StoreResult<Vec<UserPrompt>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT up.* FROM user_prompts up
             JOIN sessions s ON s.session_id = up.session_id
             WHERE s.project = ?1 ORDER BY up.created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![project, limit], row_to_prompt)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn prompts_for_session(&self, session_id: &str) -> StoreResult<Vec<UserPrompt>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM user_prompts WHERE session_id = ?1 ORDER BY prompt_number ASC",
        )?;
        let rows = stmt
            .query_map([session_id], row_to_prompt)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Newest-first, capped — used by retrieval's session scan (spec §4.7).
    pub fn prompts_for_session_capped(&self, session_id: &str, cap: u32) -> StoreResult<Vec<UserPrompt>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM user_prompts WHERE session_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![session_id, cap], row_to_prompt)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn set_prompt_embedding(&self, id: i64, embedding: &[f32]) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE user_prompts SET embedding = ?2 WHERE id = ?1",
            params![id, encode_embedding(embedding)],
        )?;
        Ok(())
    }

    pub fn prompts_without_embedding(&self, limit: u32) -> StoreResult<Vec<UserPrompt>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM user_prompts WHERE embedding IS NULL ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], row_to_prompt)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
