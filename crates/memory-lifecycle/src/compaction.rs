// crates/memory-lifecycle/src/compaction.rs
//! The ordered compress/archive/delete/vacuum pass (spec §4.8). Runs on
//! demand only — nothing in this crate schedules itself.

use agentkits_memory_core::TaskType;
use agentkits_memory_queue::enqueue;
use agentkits_memory_store::Store;
use serde::Serialize;

use crate::config::{LifecycleConfig, DAY_MS, LIFECYCLE_BATCH_LIMIT};
use crate::error::LifecycleResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleReport {
    pub compress_enqueued: usize,
    pub sessions_archived: usize,
    pub sessions_deleted: usize,
    pub vacuumed: bool,
}

/// Runs the four steps in order: enqueue compress tasks, archive aged
/// sessions, optionally delete archived-and-aged sessions, optionally
/// vacuum if anything was deleted (spec §4.8).
pub fn run_lifecycle(store: &mut Store, config: &LifecycleConfig, now_ms: u64) -> LifecycleResult<LifecycleReport> {
    let mut report = LifecycleReport::default();

    report.compress_enqueued = enqueue_stale_compressions(store, config, now_ms)?;
    report.sessions_archived = archive_aged_sessions(store, config, now_ms)?;

    if config.auto_delete {
        report.sessions_deleted = delete_aged_archived_sessions(store, config, now_ms)?;
    }

    if report.sessions_deleted > 0 && config.auto_vacuum {
        store.vacuum()?;
        report.vacuumed = true;
    }

    Ok(report)
}

fn enqueue_stale_compressions(store: &Store, config: &LifecycleConfig, now_ms: u64) -> LifecycleResult<usize> {
    let cutoff = now_ms.saturating_sub(config.compress_after_days as u64 * DAY_MS);
    let stale = store.uncompressed_observations_older_than(cutoff, LIFECYCLE_BATCH_LIMIT)?;
    for obs in &stale {
        enqueue(store, TaskType::Compress, "observations", &obs.id, now_ms)?;
    }
    Ok(stale.len())
}

fn archive_aged_sessions(store: &Store, config: &LifecycleConfig, now_ms: u64) -> LifecycleResult<usize> {
    let cutoff = now_ms.saturating_sub(config.archive_after_days as u64 * DAY_MS);
    let mut archived = 0;
    loop {
        let batch = store.sessions_completed_before(cutoff, LIFECYCLE_BATCH_LIMIT)?;
        if batch.is_empty() {
            break;
        }
        let batch_len = batch.len();
        for session in batch {
            store.mark_session_archived(&session.session_id)?;
        }
        archived += batch_len;
        if batch_len < LIFECYCLE_BATCH_LIMIT as usize {
            break;
        }
    }
    Ok(archived)
}

fn delete_aged_archived_sessions(store: &mut Store, config: &LifecycleConfig, now_ms: u64) -> LifecycleResult<usize> {
    let cutoff = now_ms.saturating_sub(config.delete_after_days as u64 * DAY_MS);
    let mut deleted = 0;
    loop {
        let batch = store.sessions_archived_before(cutoff, LIFECYCLE_BATCH_LIMIT)?;
        if batch.is_empty() {
            break;
        }
        let batch_len = batch.len();
        for session in batch {
            store.delete_session_cascade(&session.session_id)?;
        }
        deleted += batch_len;
        if batch_len < LIFECYCLE_BATCH_LIMIT as usize {
            break;
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkits_memory_core::ObservationType;
    use agentkits_memory_store::NewObservation;

    fn seed_uncompressed_observation(store: &Store, timestamp: u64) {
        store
            .insert_observation(NewObservation {
                id: format!("obs_{timestamp}"),
                session_id: "s1".into(),
                project: "proj".into(),
                tool_name: "Read".into(),
                tool_input: "{}".into(),
                tool_response: "{}".into(),
                cwd: "/tmp".into(),
                timestamp,
                r#type: ObservationType::Read,
                title: "t".into(),
                subtitle: "s".into(),
                narrative: "n".into(),
                facts: vec![],
                concepts: vec![],
                prompt_number: None,
                files_read: vec![],
                files_modified: vec![],
                content_hash: format!("hash_{timestamp}"),
            })
            .unwrap();
    }

    #[test]
    fn enqueues_compress_for_stale_uncompressed_observations() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "p", 0).unwrap();
        let now = 10 * DAY_MS;
        seed_uncompressed_observation(&store, 0);

        let config = LifecycleConfig::default();
        let report = run_lifecycle(&mut store, &config, now).unwrap();
        assert_eq!(report.compress_enqueued, 1);
        assert!(agentkits_memory_queue::has_pending(&store, agentkits_memory_core::TaskType::Compress).unwrap());
    }

    #[test]
    fn archives_completed_sessions_past_the_threshold() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "p", 0).unwrap();
        store.mark_session_completed("s1", Some("done"), 0).unwrap();

        let now = 40 * DAY_MS;
        let config = LifecycleConfig::default();
        let report = run_lifecycle(&mut store, &config, now).unwrap();
        assert_eq!(report.sessions_archived, 1);
        let session = store.get_session("s1").unwrap().unwrap();
        assert_eq!(session.status, agentkits_memory_core::SessionStatus::Archived);
    }

    #[test]
    fn leaves_recent_sessions_alone() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "p", 0).unwrap();
        store.mark_session_completed("s1", Some("done"), 0).unwrap();

        let now = 5 * DAY_MS;
        let config = LifecycleConfig::default();
        let report = run_lifecycle(&mut store, &config, now).unwrap();
        assert_eq!(report.sessions_archived, 0);
    }

    #[test]
    fn auto_delete_removes_aged_archived_sessions_and_vacuums() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "p", 0).unwrap();
        store.mark_session_completed("s1", Some("done"), 0).unwrap();
        store.mark_session_archived("s1").unwrap();

        let now = 100 * DAY_MS;
        let mut config = LifecycleConfig::default();
        config.auto_delete = true;
        let report = run_lifecycle(&mut store, &config, now).unwrap();
        assert_eq!(report.sessions_deleted, 1);
        assert!(report.vacuumed);
        assert!(store.get_session("s1").unwrap().is_none());
    }

    #[test]
    fn auto_delete_disabled_keeps_archived_sessions() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "p", 0).unwrap();
        store.mark_session_completed("s1", Some("done"), 0).unwrap();
        store.mark_session_archived("s1").unwrap();

        let now = 100 * DAY_MS;
        let config = LifecycleConfig::default();
        let report = run_lifecycle(&mut store, &config, now).unwrap();
        assert_eq!(report.sessions_deleted, 0);
        assert!(store.get_session("s1").unwrap().is_some());
    }
}
