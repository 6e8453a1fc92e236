// crates/memory-store/src/sessions.rs
//! Session CRUD: upsert-or-no-op, resume detection, status transitions.
//! Per spec §3's Session invariants and §8 scenario 1/2.

use agentkits_memory_core::queue_constants::RESUME_DETECTION_WINDOW_MS;
use agentkits_memory_core::{Session, SessionStatus};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StoreResult;
use crate::store::Store;

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    let status: String = row.get("status")?;
    Ok(Session {
        session_id: row.get("session_id")?,
        project: row.get("project")?,
        prompt: row.get("prompt")?,
        started_at: row.get::<_, i64>("started_at")? as u64,
        ended_at: row.get::<_, Option<i64>>("ended_at")?.map(|v| v as u64),
        observation_count: row.get::<_, i64>("observation_count")? as u64,
        summary: row.get("summary")?,
        status: SessionStatus::parse(&status).unwrap_or(SessionStatus::Active),
        parent_session_id: row.get("parent_session_id")?,
    })
}

impl Store {
    pub fn get_session(&self, session_id: &str) -> StoreResult<Option<Session>> {
        Ok(self
            .connection()
            .query_row(
                "SELECT * FROM sessions WHERE session_id = ?1",
                [session_id],
                row_to_session,
            )
            .optional()?)
    }

    /// Idempotent upsert: a session_id that already exists is a no-op
    /// (spec §3). On first creation, detect a same-project session started
    /// within the resume-detection window and record it as the parent.
    pub fn upsert_session(
        &self,
        session_id: &str,
        project: &str,
        prompt: &str,
        now_ms: u64,
    ) -> StoreResult<Session> {
        if let Some(existing) = self.get_session(session_id)? {
            return Ok(existing);
        }

        let cutoff = now_ms.saturating_sub(RESUME_DETECTION_WINDOW_MS) as i64;
        let parent_session_id: Option<String> = self
            .connection()
            .query_row(
                "SELECT session_id FROM sessions
                 WHERE project = ?1 AND session_id != ?2 AND started_at >= ?3
                 ORDER BY started_at DESC LIMIT 1",
                params![project, session_id, cutoff],
                |row| row.get(0),
            )
            .optional()?;

        self.connection().execute(
            "INSERT INTO sessions (session_id, project, prompt, started_at, observation_count, status, parent_session_id)
             VALUES (?1, ?2, ?3, ?4, 0, 'active', ?5)",
            params![session_id, project, prompt, now_ms as i64, parent_session_id],
        )?;

        Ok(self.get_session(session_id)?.expect("just inserted"))
    }

    /// Insert a previously-exported session verbatim under its (remapped)
    /// `session_id`, skipping the resume-detection/idempotent-upsert logic
    /// `upsert_session` applies — import sessions are always new rows
    /// (spec §4.8).
    pub fn insert_session_import(&self, session: &Session) -> StoreResult<()> {
        self.connection().execute(
            "INSERT INTO sessions (session_id, project, prompt, started_at, ended_at, observation_count, summary, status, parent_session_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                session.session_id,
                session.project,
                session.prompt,
                session.started_at as i64,
                session.ended_at.map(|v| v as i64),
                session.observation_count as i64,
                session.summary,
                session.status.as_str(),
                session.parent_session_id,
            ],
        )?;
        Ok(())
    }

    pub fn mark_session_completed(&self, session_id: &str, summary: Option<&str>, ended_at: u64) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE sessions SET status = 'completed', summary = ?2, ended_at = ?3 WHERE session_id = ?1",
            params![session_id, summary, ended_at as i64],
        )?;
        Ok(())
    }

    pub fn mark_session_archived(&self, session_id: &str) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE sessions SET status = 'archived' WHERE session_id = ?1 AND ended_at IS NOT NULL",
            [session_id],
        )?;
        Ok(())
    }

    pub fn increment_observation_count(&self, session_id: &str) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE sessions SET observation_count = observation_count + 1 WHERE session_id = ?1",
            [session_id],
        )?;
        Ok(())
    }

    pub fn recent_sessions(&self, project: &str, limit: u32) -> StoreResult<Vec<Session>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM sessions WHERE project = ?1 ORDER BY started_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![project, limit], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn sessions_completed_before(&self, cutoff_ms: u64, limit: u32) -> StoreResult<Vec<Session>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM sessions WHERE status = 'completed' AND ended_at < ?1 ORDER BY ended_at ASC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![cutoff_ms as i64, limit], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn sessions_archived_before(&self, cutoff_ms: u64, limit: u32) -> StoreResult<Vec<Session>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM sessions WHERE status = 'archived' AND ended_at < ?1 ORDER BY ended_at ASC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![cutoff_ms as i64, limit], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_sessions_by_status(&self) -> StoreResult<Vec<(String, u64)>> {
        let conn = self.connection();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM sessions GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete a session and all dependent rows in one transaction, per the
    /// lifecycle manager's explicit (non-FK) cascade (spec §9). Task-queue
    /// rows are cleaned up first, while the target ids they reference still
    /// exist to be looked up.
    pub fn delete_session_cascade(&mut self, session_id: &str) -> StoreResult<()> {
        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "DELETE FROM task_queue WHERE target_table = 'observations' AND target_id IN (
                SELECT id FROM observations WHERE session_id = ?1
            )",
            [session_id],
        )?;
        tx.execute(
            "DELETE FROM task_queue WHERE target_table = 'user_prompts' AND target_id IN (
                SELECT CAST(id AS TEXT) FROM user_prompts WHERE session_id = ?1
            )",
            [session_id],
        )?;
        tx.execute(
            "DELETE FROM task_queue WHERE target_table = 'session_summaries' AND target_id IN (
                SELECT CAST(id AS TEXT) FROM session_summaries WHERE session_id = ?1
            )",
            [session_id],
        )?;
        tx.execute(
            "DELETE FROM task_queue WHERE target_table = 'session_digests' AND target_id IN (
                SELECT CAST(id AS TEXT) FROM session_digests WHERE session_id = ?1
            )",
            [session_id],
        )?;
        tx.execute("DELETE FROM observations WHERE session_id = ?1", [session_id])?;
        tx.execute("DELETE FROM user_prompts WHERE session_id = ?1", [session_id])?;
        tx.execute("DELETE FROM session_summaries WHERE session_id = ?1", [session_id])?;
        tx.execute("DELETE FROM session_digests WHERE session_id = ?1", [session_id])?;
        tx.execute("DELETE FROM sessions WHERE session_id = ?1", [session_id])?;
        tx.commit()?;
        Ok(())
    }
}
