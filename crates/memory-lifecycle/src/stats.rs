// crates/memory-lifecycle/src/stats.rs
//! The statistics reporter (spec §4.8): counts of sessions by status,
//! observations by compression state, total prompts, and database file
//! size.

use agentkits_memory_store::{Store, StoreError};
use serde::Serialize;

use crate::error::LifecycleResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleStats {
    pub sessions_by_status: Vec<(String, u64)>,
    pub observations_compressed: u64,
    pub observations_uncompressed: u64,
    pub total_prompts: u64,
    pub db_size_bytes: u64,
}

pub fn collect_stats(store: &Store) -> LifecycleResult<LifecycleStats> {
    let sessions_by_status = store.count_sessions_by_status()?;
    let (observations_compressed, observations_uncompressed) = store.count_observations_by_compression()?;
    let total_prompts: u64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM user_prompts", [], |row| row.get::<_, i64>(0))
        .map_err(StoreError::from)
        .map(|n| n as u64)?;
    let db_size_bytes = store.db_size_bytes()?;

    Ok(LifecycleStats {
        sessions_by_status,
        observations_compressed,
        observations_uncompressed,
        total_prompts,
        db_size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_zeroed_stats_on_an_empty_store() {
        let store = Store::open_in_memory().unwrap();
        let stats = collect_stats(&store).unwrap();
        assert!(stats.sessions_by_status.is_empty());
        assert_eq!(stats.observations_compressed, 0);
        assert_eq!(stats.total_prompts, 0);
    }

    #[test]
    fn counts_prompts_across_sessions() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "p", 0).unwrap();
        store.insert_user_prompt("s1", "proj", "hello", 0).unwrap();
        store.insert_user_prompt("s1", "proj", "world", 1).unwrap();
        let stats = collect_stats(&store).unwrap();
        assert_eq!(stats.total_prompts, 2);
    }
}
