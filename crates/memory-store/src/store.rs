// crates/memory-store/src/store.rs
//! The embedded database handle: open/create, WAL + busy-timeout, idempotent
//! migrations. Mirrors `claude-view-db::Database::new`'s builder chain,
//! translated from `sqlx`'s async pool to a single synchronous `rusqlite`
//! connection (SPEC_FULL.md §4.1 — this port is a short-lived CLI process
//! per invocation, not a long-running server).

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::{StoreError, StoreResult};
use crate::migrations::MIGRATIONS;
use crate::vector;

pub struct Store {
    conn: Connection,
    db_path: PathBuf,
    pub(crate) vector_index_available: bool,
}

impl Store {
    /// Open (or create) the database at `path` and run all migrations.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        vector::register_vec_extension();
        let conn = Connection::open(path)?;
        Self::from_connection(conn, path.to_path_buf())
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        vector::register_vec_extension();
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, PathBuf::new())
    }

    fn from_connection(conn: Connection, db_path: PathBuf) -> StoreResult<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "busy_timeout", 10_000i64)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let vector_index_available = vector::vector_index_available(&conn);
        if !vector_index_available {
            tracing::warn!("sqlite-vec extension unavailable, falling back to brute-force cosine similarity");
        }

        let store = Self {
            conn,
            db_path,
            vector_index_available,
        };
        store.run_migrations()?;
        tracing::debug!(path = %store.db_path.display(), "store opened");
        Ok(store)
    }

    fn run_migrations(&self) -> StoreResult<()> {
        self.conn
            .execute_batch("CREATE TABLE IF NOT EXISTS _migrations (version INTEGER PRIMARY KEY)")?;

        let current_version: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i64;
            if version > current_version {
                self.conn.execute_batch(migration)?;
                self.conn
                    .execute("INSERT INTO _migrations (version) VALUES (?1)", [version])?;
            }
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn vector_index_available(&self) -> bool {
        self.vector_index_available
    }

    /// Default on-disk path: `<project>/<memoryDir>/memory.db`, created via
    /// `agentkits_memory_core::paths`.
    pub fn open_default(memory_dir: &Path) -> StoreResult<Self> {
        Self::open(&agentkits_memory_core::paths::db_path(memory_dir))
    }

    pub fn no_cache_dir_err() -> StoreError {
        StoreError::NoCacheDir
    }

    /// Reclaim space after a deletion pass (spec §4.8 "autoVacuum").
    pub fn vacuum(&self) -> StoreResult<()> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    /// Database file size in bytes, `0` for the in-memory test database.
    pub fn db_size_bytes(&self) -> StoreResult<u64> {
        if self.db_path.as_os_str().is_empty() {
            return Ok(0);
        }
        Ok(std::fs::metadata(&self.db_path)?.len())
    }

    /// `(sessions, observations, prompts)` row counts for a project, used by
    /// the `context` and `user-message` handlers to decide whether a project
    /// has any recorded history yet.
    pub fn project_activity_counts(&self, project: &str) -> StoreResult<(u64, u64, u64)> {
        let conn = self.connection();
        let sessions: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE project = ?1",
            [project],
            |row| row.get(0),
        )?;
        let observations: i64 = conn.query_row(
            "SELECT COUNT(*) FROM observations WHERE project = ?1",
            [project],
            |row| row.get(0),
        )?;
        let prompts: i64 = conn.query_row(
            "SELECT COUNT(*) FROM user_prompts up JOIN sessions s ON s.session_id = up.session_id WHERE s.project = ?1",
            [project],
            |row| row.get(0),
        )?;
        Ok((sessions as u64, observations as u64, prompts as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_memory_and_runs_migrations() {
        let store = Store::open_in_memory().unwrap();
        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, MIGRATIONS.len());
    }

    #[test]
    fn reopening_a_file_database_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.db");
        {
            let _store = Store::open(&path).unwrap();
        }
        let store = Store::open(&path).unwrap();
        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, MIGRATIONS.len());
    }

    #[test]
    fn project_activity_counts_are_scoped_to_the_project() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj-a", "p", 0).unwrap();
        store.upsert_session("s2", "proj-b", "p", 0).unwrap();
        store.insert_user_prompt("s1", "proj-a", "hello", 0).unwrap();

        let (sessions, observations, prompts) = store.project_activity_counts("proj-a").unwrap();
        assert_eq!(sessions, 1);
        assert_eq!(observations, 0);
        assert_eq!(prompts, 1);

        let (sessions_b, _, prompts_b) = store.project_activity_counts("proj-b").unwrap();
        assert_eq!(sessions_b, 1);
        assert_eq!(prompts_b, 0);
    }
}
