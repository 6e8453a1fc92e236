// crates/memory-store/src/digests.rs
//! SessionDigest CRUD: at most one per session, produced only by AI
//! compression (spec §3).

use agentkits_memory_core::SessionDigest;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StoreResult;
use crate::store::Store;
use crate::vector::{decode_embedding, encode_embedding};

fn row_to_digest(row: &Row) -> rusqlite::Result<SessionDigest> {
    let embedding: Option<Vec<u8>> = row.get("embedding")?;
    Ok(SessionDigest {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        project: row.get("project")?,
        digest: row.get("digest")?,
        observation_count: row.get::<_, i64>("observation_count")? as u64,
        created_at: row.get::<_, i64>("created_at")? as u64,
        embedding: embedding.map(|b| decode_embedding(&b)),
    })
}

impl Store {
    /// Insert or replace the session's digest (spec §4.5 Compress: "stores
    /// it as a SessionDigest, replacing any existing one").
    pub fn upsert_session_digest(
        &self,
        session_id: &str,
        project: &str,
        digest: &str,
        observation_count: u64,
        created_at: u64,
    ) -> StoreResult<SessionDigest> {
        self.connection().execute(
            "INSERT INTO session_digests (session_id, project, digest, observation_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(session_id) DO UPDATE SET
                digest = excluded.digest,
                observation_count = excluded.observation_count,
                created_at = excluded.created_at,
                embedding = NULL",
            params![session_id, project, digest, observation_count as i64, created_at as i64],
        )?;
        Ok(self.get_session_digest(session_id)?.expect("just upserted"))
    }

    pub fn get_session_digest(&self, session_id: &str) -> StoreResult<Option<SessionDigest>> {
        Ok(self
            .connection()
            .query_row(
                "SELECT * FROM session_digests WHERE session_id = ?1",
                [session_id],
                row_to_digest,
            )
            .optional()?)
    }

    pub fn set_digest_embedding(&self, id: i64, embedding: &[f32]) -> StoreResult<()> {
        self.connection().execute(
            "UPDATE session_digests SET embedding = ?2 WHERE id = ?1",
            params![id, encode_embedding(embedding)],
        )?;
        Ok(())
    }

    pub fn digests_without_embedding(&self, limit: u32) -> StoreResult<Vec<SessionDigest>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT * FROM session_digests WHERE embedding IS NULL ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], row_to_digest)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
