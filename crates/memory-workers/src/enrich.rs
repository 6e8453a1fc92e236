// crates/memory-workers/src/enrich.rs
//! Enrich worker: AI-enriches one observation's derived fields per claimed
//! task. An unavailable provider, a timeout, or invalid JSON all count as
//! a failed attempt — the task retries up to the limit, and on final
//! failure the observation simply keeps its template-derived fields
//! (spec §4.5 Enrich, §4.6).

use agentkits_memory_core::queue_constants::WORKER_BATCH_LIMIT;
use agentkits_memory_core::TaskType;
use agentkits_memory_providers::{build_enrich_observation_prompt, parse_enrich_observation_response, AiProvider};
use agentkits_memory_store::Store;

use crate::error::WorkerResult;

/// Generous enough for a local CLI round trip; short enough that a hung
/// provider doesn't stall the worker's batch indefinitely.
const ENRICH_TIMEOUT_MS: u64 = 30_000;

const ENRICH_SYSTEM_PROMPT: &str =
    "You analyze a single coding-agent tool invocation and produce a short, factual enrichment. Reply with JSON only.";

#[derive(Debug, Default, Clone, Copy)]
pub struct EnrichStats {
    pub processed: usize,
}

pub fn enrich_one(store: &Store, ai: &dyn AiProvider, target_id: &str) -> WorkerResult<bool> {
    let Some(obs) = store.get_observation(target_id)? else {
        return Ok(true);
    };

    let prompt = build_enrich_observation_prompt(&obs.tool_name, &obs.tool_input, &obs.tool_response);
    let Some(raw) = ai.run(&prompt, ENRICH_SYSTEM_PROMPT, ENRICH_TIMEOUT_MS) else {
        return Ok(false);
    };
    let Some(parsed) = parse_enrich_observation_response(&raw) else {
        return Ok(false);
    };

    store.enrich_observation(&obs.id, &parsed.subtitle, &parsed.narrative, &parsed.facts, &parsed.concepts)?;
    Ok(true)
}

pub fn run_enrich_batch(store: &mut Store, ai: &dyn AiProvider, should_stop: &dyn Fn() -> bool) -> WorkerResult<EnrichStats> {
    let mut stats = EnrichStats::default();

    while stats.processed < WORKER_BATCH_LIMIT && !should_stop() {
        let Some(task) = agentkits_memory_queue::claim_one(store, TaskType::Enrich)? else {
            break;
        };

        match enrich_one(store, ai, &task.target_id) {
            Ok(true) => agentkits_memory_queue::complete(store, task.id)?,
            Ok(false) => {
                agentkits_memory_queue::retry_or_fail(store, task.id, task.retry_count)?;
            }
            Err(e) => {
                tracing::warn!(error = %e, task_id = task.id, "enrich task errored");
                agentkits_memory_queue::retry_or_fail(store, task.id, task.retry_count)?;
            }
        }
        stats.processed += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkits_memory_core::queue_constants::MAX_RETRIES;
    use agentkits_memory_store::NewObservation;

    struct AlwaysUnavailable;
    impl AiProvider for AlwaysUnavailable {
        fn run(&self, _user_prompt: &str, _system_prompt: &str, _timeout_ms: u64) -> Option<String> {
            None
        }
        fn is_available(&self) -> bool {
            false
        }
        fn name(&self) -> &str {
            "unavailable"
        }
    }

    struct AlwaysSucceeds;
    impl AiProvider for AlwaysSucceeds {
        fn run(&self, _user_prompt: &str, _system_prompt: &str, _timeout_ms: u64) -> Option<String> {
            Some(r#"{"subtitle":"s","narrative":"a narrative long enough","facts":["f1"],"concepts":["c1"],"confidence":0.9}"#.to_string())
        }
        fn is_available(&self) -> bool {
            true
        }
        fn name(&self) -> &str {
            "always"
        }
    }

    fn seed_observation(store: &Store) {
        store
            .insert_observation(NewObservation {
                id: "obs1".into(),
                session_id: "s1".into(),
                project: "proj".into(),
                tool_name: "Read".into(),
                tool_input: "{}".into(),
                tool_response: "{}".into(),
                cwd: "/tmp".into(),
                timestamp: 1000,
                r#type: agentkits_memory_core::ObservationType::Read,
                title: "Read a file".into(),
                subtitle: "orig-sub".into(),
                narrative: "orig-narrative".into(),
                facts: vec![],
                concepts: vec![],
                prompt_number: Some(1),
                files_read: vec![],
                files_modified: vec![],
                content_hash: "hash1".into(),
            })
            .unwrap();
    }

    #[test]
    fn successful_enrichment_overwrites_fields() {
        let mut store = Store::open_in_memory().unwrap();
        seed_observation(&store);
        agentkits_memory_queue::enqueue(&store, TaskType::Enrich, "observations", "obs1", 1000).unwrap();

        run_enrich_batch(&mut store, &AlwaysSucceeds, &|| false).unwrap();

        let obs = store.get_observation("obs1").unwrap().unwrap();
        assert_eq!(obs.subtitle, "s");
        assert_eq!(obs.facts, vec!["f1"]);
    }

    #[test]
    fn unavailable_provider_exhausts_retries_and_keeps_template_fields() {
        let mut store = Store::open_in_memory().unwrap();
        seed_observation(&store);
        agentkits_memory_queue::enqueue(&store, TaskType::Enrich, "observations", "obs1", 1000).unwrap();

        for _ in 0..MAX_RETRIES {
            run_enrich_batch(&mut store, &AlwaysUnavailable, &|| false).unwrap();
        }

        assert!(!agentkits_memory_queue::has_pending(&store, TaskType::Enrich).unwrap());
        let obs = store.get_observation("obs1").unwrap().unwrap();
        assert_eq!(obs.subtitle, "orig-sub");
        assert_eq!(obs.narrative, "orig-narrative");
    }
}
