// crates/memory-queue/src/lib.rs
//! The durable task queue (L2): a single table, atomic claim via an
//! immediate transaction, bounded retries, terminal `failed` state.
//! Grounded on `claude-view-server-jobs`'s jobs-as-rows shape and
//! `claude-view-db`'s migration-table transaction discipline.

mod error;

pub use error::{QueueError, QueueResult};

use agentkits_memory_core::queue_constants::MAX_RETRIES;
use agentkits_memory_core::{TaskStatus, TaskType};
use agentkits_memory_store::Store;
use rusqlite::params;

/// A claimed task row, ready for a worker to act on.
#[derive(Debug, Clone)]
pub struct ClaimedTask {
    pub id: i64,
    pub task_type: TaskType,
    pub target_table: String,
    pub target_id: String,
    pub retry_count: u32,
}

/// Enqueue one task. A single non-blocking `INSERT` (spec §4.4).
pub fn enqueue(store: &Store, task_type: TaskType, target_table: &str, target_id: &str, now_ms: u64) -> QueueResult<i64> {
    store.connection().execute(
        "INSERT INTO task_queue (task_type, target_table, target_id, created_at, status, retry_count)
         VALUES (?1, ?2, ?3, ?4, 'pending', 0)",
        params![task_type.as_str(), target_table, target_id, now_ms as i64],
    )?;
    Ok(store.connection().last_insert_rowid())
}

/// Whether any pending task of `task_type` exists — used by handlers to
/// decide whether spawning a worker is worthwhile (spec §4.5).
pub fn has_pending(store: &Store, task_type: TaskType) -> QueueResult<bool> {
    let count: i64 = store.connection().query_row(
        "SELECT COUNT(*) FROM task_queue WHERE task_type = ?1 AND status = 'pending' AND retry_count < ?2",
        params![task_type.as_str(), MAX_RETRIES],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Atomically claim the oldest eligible row of `task_type`: `BEGIN
/// IMMEDIATE` serializes the claim against other worker processes racing
/// on the same database file (spec §4.4, §5 — two OS processes, not just
/// two threads, may race here).
pub fn claim_one(store: &mut Store, task_type: TaskType) -> QueueResult<Option<ClaimedTask>> {
    let tx = store.conn_mut().transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

    let row = tx
        .query_row(
            "SELECT id, target_table, target_id, retry_count FROM task_queue
             WHERE task_type = ?1 AND status = 'pending' AND retry_count < ?2
             ORDER BY id ASC LIMIT 1",
            params![task_type.as_str(), MAX_RETRIES],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)? as u32,
                ))
            },
        )
        .optional_or_none()?;

    let Some((id, target_table, target_id, retry_count)) = row else {
        tx.commit()?;
        return Ok(None);
    };

    tx.execute("UPDATE task_queue SET status = 'processing' WHERE id = ?1", [id])?;
    tx.commit()?;

    Ok(Some(ClaimedTask {
        id,
        task_type,
        target_table,
        target_id,
        retry_count,
    }))
}

/// Mark a claimed task's target completed: delete the row.
pub fn complete(store: &Store, task_id: i64) -> QueueResult<()> {
    store.connection().execute("DELETE FROM task_queue WHERE id = ?1", [task_id])?;
    Ok(())
}

/// Mark a claimed task failed this attempt: increment `retry_count`; if it
/// reaches `MAX_RETRIES` the row becomes terminally `failed`, otherwise it
/// returns to `pending` for a later attempt (spec §4.4).
pub fn retry_or_fail(store: &Store, task_id: i64, retry_count: u32) -> QueueResult<TaskStatus> {
    let next_retry = retry_count + 1;
    let next_status = if next_retry >= MAX_RETRIES {
        TaskStatus::Failed
    } else {
        TaskStatus::Pending
    };
    store.connection().execute(
        "UPDATE task_queue SET retry_count = ?2, status = ?3 WHERE id = ?1",
        params![task_id, next_retry, next_status.as_str()],
    )?;
    Ok(next_status)
}

/// Small helper trait so `query_row`'s `QueryReturnedNoRows` reads as an
/// `Option` instead of an error at call sites above.
trait OptionalOrNone<T> {
    fn optional_or_none(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalOrNone<T> for rusqlite::Result<T> {
    fn optional_or_none(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn claim_returns_none_on_empty_queue() {
        let mut s = store();
        assert!(claim_one(&mut s, TaskType::Embed).unwrap().is_none());
    }

    #[test]
    fn enqueue_then_claim_then_complete() {
        let mut s = store();
        enqueue(&s, TaskType::Embed, "observations", "obs_1", 1000).unwrap();
        assert!(has_pending(&s, TaskType::Embed).unwrap());

        let task = claim_one(&mut s, TaskType::Embed).unwrap().unwrap();
        assert_eq!(task.target_id, "obs_1");
        assert!(!has_pending(&s, TaskType::Embed).unwrap());

        complete(&s, task.id).unwrap();
        let count: i64 = s.connection().query_row("SELECT COUNT(*) FROM task_queue", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn retry_exhaustion_reaches_failed_after_max_retries() {
        let mut s = store();
        enqueue(&s, TaskType::Enrich, "observations", "obs_1", 1000).unwrap();

        let mut last_status = TaskStatus::Pending;
        for _ in 0..3 {
            let task = claim_one(&mut s, TaskType::Enrich).unwrap().unwrap();
            last_status = retry_or_fail(&s, task.id, task.retry_count).unwrap();
        }
        assert_eq!(last_status, TaskStatus::Failed);
        assert!(claim_one(&mut s, TaskType::Enrich).unwrap().is_none());
    }

    #[test]
    fn claim_is_fifo_within_a_task_type() {
        let mut s = store();
        enqueue(&s, TaskType::Embed, "observations", "first", 1000).unwrap();
        enqueue(&s, TaskType::Embed, "observations", "second", 1001).unwrap();

        let first = claim_one(&mut s, TaskType::Embed).unwrap().unwrap();
        assert_eq!(first.target_id, "first");
    }
}
