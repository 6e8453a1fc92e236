// crates/memory-workers/src/compress.rs
//! Compress worker: two modes distinguished by the claimed task's target
//! table (spec §4.5 Compress).
//!
//! - `"observations"`: compress one observation into a dense summary,
//!   destroying its raw `tool_input`/`tool_response` payloads.
//! - `"sessions"`: compress every still-uncompressed observation in the
//!   session, then derive and store a SessionDigest, then enqueue an embed
//!   task for it.

use agentkits_memory_core::queue_constants::WORKER_BATCH_LIMIT;
use agentkits_memory_core::{Observation, TaskType};
use agentkits_memory_providers::{
    build_compress_observation_prompt, build_generate_digest_prompt, parse_compress_observation_response,
    parse_generate_digest_response, AiProvider,
};
use agentkits_memory_store::Store;

use crate::error::WorkerResult;

const COMPRESS_TIMEOUT_MS: u64 = 30_000;
const COMPRESS_SYSTEM_PROMPT: &str = "You compress a coding-agent observation into a dense summary. Reply with JSON only.";
const DIGEST_SYSTEM_PROMPT: &str = "You summarize a completed coding-agent session into a short digest. Reply with JSON only.";

#[derive(Debug, Default, Clone, Copy)]
pub struct CompressStats {
    pub processed: usize,
}

fn compress_one_observation(store: &Store, ai: &dyn AiProvider, obs: &Observation) -> Option<()> {
    let prompt = build_compress_observation_prompt(&obs.title, &obs.narrative, &obs.facts);
    let raw = ai.run(&prompt, COMPRESS_SYSTEM_PROMPT, COMPRESS_TIMEOUT_MS)?;
    let parsed = parse_compress_observation_response(&raw)?;
    store.compress_observation(&obs.id, &parsed.compressed_summary).ok()?;
    Some(())
}

fn compress_session(store: &Store, ai: &dyn AiProvider, session_id: &str) -> WorkerResult<bool> {
    let observations = store.observations_for_session(session_id)?;
    let Some(first) = observations.first() else {
        return Ok(true);
    };
    let project = first.project.clone();

    for obs in observations.iter().filter(|o| !o.is_compressed) {
        if compress_one_observation(store, ai, obs).is_none() {
            tracing::warn!(observation_id = %obs.id, "failed to compress observation during session compress");
        }
    }

    let observations = store.observations_for_session(session_id)?;
    let summaries: Vec<String> = observations
        .iter()
        .filter_map(|o| o.compressed_summary.clone().or_else(|| Some(o.title.clone())))
        .collect();

    let latest_summary = store.summaries_for_session(session_id)?.into_iter().last();
    let (request, completed, files_modified) = match &latest_summary {
        Some(s) => (s.request.clone(), s.completed.clone(), s.files_modified.clone()),
        None => (
            String::new(),
            String::new(),
            observations.iter().flat_map(|o| o.files_modified.clone()).collect(),
        ),
    };

    let prompt = build_generate_digest_prompt(&request, &summaries, &completed, &files_modified);
    let Some(raw) = ai.run(&prompt, DIGEST_SYSTEM_PROMPT, COMPRESS_TIMEOUT_MS) else {
        return Ok(false);
    };
    let Some(parsed) = parse_generate_digest_response(&raw) else {
        return Ok(false);
    };

    let now_ms = observations.last().map(|o| o.timestamp).unwrap_or(0);
    store.upsert_session_digest(session_id, &project, &parsed.digest, observations.len() as u64, now_ms)?;
    agentkits_memory_queue::enqueue(store, TaskType::Embed, "session_digests", session_id, now_ms)?;

    Ok(true)
}

pub fn run_compress_batch(store: &mut Store, ai: &dyn AiProvider, should_stop: &dyn Fn() -> bool) -> WorkerResult<CompressStats> {
    let mut stats = CompressStats::default();

    while stats.processed < WORKER_BATCH_LIMIT && !should_stop() {
        let Some(task) = agentkits_memory_queue::claim_one(store, TaskType::Compress)? else {
            break;
        };

        let outcome = match task.target_table.as_str() {
            "observations" => match store.get_observation(&task.target_id)? {
                Some(obs) if !obs.is_compressed => compress_one_observation(store, ai, &obs).is_some(),
                _ => true,
            },
            "sessions" => compress_session(store, ai, &task.target_id)?,
            other => {
                tracing::warn!(target_table = other, "compress task for unknown target table, dropping");
                true
            }
        };

        if outcome {
            agentkits_memory_queue::complete(store, task.id)?;
        } else {
            agentkits_memory_queue::retry_or_fail(store, task.id, task.retry_count)?;
        }
        stats.processed += 1;
    }

    Ok(stats)
}
