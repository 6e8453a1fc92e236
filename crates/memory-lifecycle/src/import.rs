// crates/memory-lifecycle/src/import.rs
//! Import a previously-exported project back into the store (spec §4.8):
//! fresh session ids, content-hash dedup within a shared 5-minute window,
//! preserved `prompt_number`s, fresh embed tasks, one transaction.

use agentkits_memory_core::queue_constants::PROMPT_DEDUP_WINDOW_MS;
use agentkits_memory_core::{Session, TaskType};
use agentkits_memory_store::{Store, StoreError};
use rand::Rng;
use rusqlite::params;

use crate::error::LifecycleResult;
use crate::export::ExportDocument;

/// Reused as the import dedup window — the same "don't re-record the same
/// content twice in a few minutes" policy the prompt dedup path already
/// applies (spec §4.8 calls for "a 5-minute import window").
const IMPORT_DEDUP_WINDOW_MS: u64 = PROMPT_DEDUP_WINDOW_MS;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub sessions_imported: usize,
    pub prompts_imported: usize,
    pub prompts_deduped: usize,
    pub observations_imported: usize,
    pub observations_deduped: usize,
}

fn fresh_session_id(now_ms: u64) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect();
    format!("imported_{now_ms}_{suffix}")
}

fn prompt_duplicate_exists(tx: &rusqlite::Transaction, content_hash: &str, created_at: u64) -> rusqlite::Result<bool> {
    let window = IMPORT_DEDUP_WINDOW_MS as i64;
    let created_at = created_at as i64;
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM user_prompts WHERE content_hash = ?1 AND created_at BETWEEN ?2 AND ?3",
        params![content_hash, created_at - window, created_at + window],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn observation_duplicate_exists(tx: &rusqlite::Transaction, content_hash: &str, timestamp: u64) -> rusqlite::Result<bool> {
    let window = IMPORT_DEDUP_WINDOW_MS as i64;
    let timestamp = timestamp as i64;
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM observations WHERE content_hash = ?1 AND timestamp BETWEEN ?2 AND ?3",
        params![content_hash, timestamp - window, timestamp + window],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Imports every session in `doc` under a fresh `imported_<epoch>_<rand>`
/// id, inside one transaction.
pub fn import_project(store: &Store, doc: &ExportDocument, now_ms: u64) -> LifecycleResult<ImportReport> {
    let conn = store.connection();
    let tx = conn.unchecked_transaction().map_err(StoreError::from)?;
    let mut report = ImportReport::default();

    for session in &doc.sessions {
        let new_session_id = fresh_session_id(now_ms);
        let remapped = Session {
            session_id: new_session_id.clone(),
            project: session.project.clone(),
            prompt: session.prompt.clone(),
            started_at: session.started_at,
            ended_at: session.ended_at,
            observation_count: 0,
            summary: session.summary.clone(),
            status: session.status,
            parent_session_id: None,
        };
        store.insert_session_import(&remapped)?;
        report.sessions_imported += 1;

        for prompt in &session.prompts {
            if prompt_duplicate_exists(&tx, &prompt.content_hash, prompt.created_at).map_err(StoreError::from)? {
                report.prompts_deduped += 1;
                continue;
            }
            store.insert_user_prompt_import(
                &new_session_id,
                prompt.prompt_number,
                &prompt.prompt_text,
                &prompt.content_hash,
                prompt.created_at,
            )?;
            report.prompts_imported += 1;
        }

        for obs in &session.observations {
            if observation_duplicate_exists(&tx, &obs.content_hash, obs.timestamp).map_err(StoreError::from)? {
                report.observations_deduped += 1;
                continue;
            }
            let mut remapped_obs = obs.clone();
            remapped_obs.session_id = new_session_id.clone();
            remapped_obs.embedding = None;
            store.insert_observation_import(&remapped_obs)?;
            report.observations_imported += 1;

            enqueue_embed(&tx, "observations", &remapped_obs.id, now_ms).map_err(StoreError::from)?;
        }

        for summary in &session.session_summaries {
            let mut remapped_summary = summary.clone();
            remapped_summary.session_id = new_session_id.clone();
            remapped_summary.embedding = None;
            let inserted = store.insert_session_summary(agentkits_memory_store::NewSessionSummary {
                session_id: remapped_summary.session_id,
                project: remapped_summary.project,
                request: remapped_summary.request,
                completed: remapped_summary.completed,
                files_read: remapped_summary.files_read,
                files_modified: remapped_summary.files_modified,
                next_steps: remapped_summary.next_steps,
                notes: remapped_summary.notes,
                decisions: remapped_summary.decisions,
                errors: remapped_summary.errors,
                prompt_number: remapped_summary.prompt_number,
                created_at: remapped_summary.created_at,
            })?;
            enqueue_embed(&tx, "session_summaries", &inserted.id.to_string(), now_ms).map_err(StoreError::from)?;
        }

        if let Some(digest) = &session.digest {
            let inserted = store.upsert_session_digest(
                &new_session_id,
                &session.project,
                &digest.digest,
                digest.observation_count,
                digest.created_at,
            )?;
            enqueue_embed(&tx, "session_digests", &inserted.id.to_string(), now_ms).map_err(StoreError::from)?;
        }
    }

    tx.commit().map_err(StoreError::from)?;
    Ok(report)
}

fn enqueue_embed(tx: &rusqlite::Transaction, target_table: &str, target_id: &str, now_ms: u64) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO task_queue (task_type, target_table, target_id, created_at, status, retry_count)
         VALUES (?1, ?2, ?3, ?4, 'pending', 0)",
        params![TaskType::Embed.as_str(), target_table, target_id, now_ms as i64],
    )?;
    Ok(())
}
