// crates/memory-workers/src/embed.rs
//! Embed worker: drains queued `embed` tasks, then performs a catch-up pass
//! over any row in the four embeddable tables that still has a null
//! embedding, ordered newest first, so a lost queue row can't leave a gap
//! forever (spec §4.5 step 4).

use agentkits_memory_core::queue_constants::WORKER_BATCH_LIMIT;
use agentkits_memory_core::{Observation, SessionDigest, SessionSummary, TaskType, UserPrompt};
use agentkits_memory_providers::EmbeddingProvider;
use agentkits_memory_store::Store;

use crate::error::WorkerResult;

#[derive(Debug, Default, Clone, Copy)]
pub struct EmbedStats {
    pub queue_processed: usize,
    pub catch_up_processed: usize,
}

/// Canonicalized embedding text per record kind (spec §4.5 Embed).
fn observation_text(obs: &Observation) -> String {
    if let Some(summary) = &obs.compressed_summary {
        summary.clone()
    } else {
        format!("{} {} {} {}", obs.title, obs.subtitle, obs.narrative, obs.concepts.join(" "))
    }
}

fn prompt_text(prompt: &UserPrompt) -> String {
    prompt.prompt_text.clone()
}

fn summary_text(summary: &SessionSummary) -> String {
    format!("{} {} {} {}", summary.request, summary.completed, summary.next_steps, summary.notes)
}

fn digest_text(digest: &SessionDigest) -> String {
    digest.digest.clone()
}

/// Embed one claimed task's target row. Returns `Ok(false)` for an unknown
/// or already-gone target (treated as a successful no-op, not a retry).
fn embed_claimed_target(store: &Store, embedder: &dyn EmbeddingProvider, target_table: &str, target_id: &str) -> WorkerResult<bool> {
    match target_table {
        "observations" => {
            let Some(obs) = store.get_observation(target_id)? else {
                return Ok(false);
            };
            let vector = embedder.embed(&observation_text(&obs));
            store.set_observation_embedding(&obs.id, &vector)?;
        }
        "user_prompts" => {
            let id: i64 = target_id.parse().unwrap_or(-1);
            let Some(prompt) = store.get_prompt(id)? else {
                return Ok(false);
            };
            let vector = embedder.embed(&prompt_text(&prompt));
            store.set_prompt_embedding(prompt.id, &vector)?;
        }
        "session_summaries" => {
            let id: i64 = target_id.parse().unwrap_or(-1);
            let Some(summary) = store.get_summary(id)? else {
                return Ok(false);
            };
            let vector = embedder.embed(&summary_text(&summary));
            store.set_summary_embedding(summary.id, &vector)?;
        }
        "session_digests" => {
            let Some(digest) = store.get_session_digest(target_id)? else {
                return Ok(false);
            };
            let vector = embedder.embed(&digest_text(&digest));
            store.set_digest_embedding(digest.id, &vector)?;
        }
        other => {
            tracing::warn!(target_table = other, "embed task for unknown target table, dropping");
        }
    }
    Ok(true)
}

fn catch_up_embeddings(store: &Store, embedder: &dyn EmbeddingProvider, budget: usize) -> WorkerResult<usize> {
    let mut done = 0usize;

    for obs in store.observations_without_embedding(budget as u32)? {
        let vector = embedder.embed(&observation_text(&obs));
        store.set_observation_embedding(&obs.id, &vector)?;
        done += 1;
    }
    for prompt in store.prompts_without_embedding(budget as u32)? {
        let vector = embedder.embed(&prompt_text(&prompt));
        store.set_prompt_embedding(prompt.id, &vector)?;
        done += 1;
    }
    for summary in store.summaries_without_embedding(budget as u32)? {
        let vector = embedder.embed(&summary_text(&summary));
        store.set_summary_embedding(summary.id, &vector)?;
        done += 1;
    }
    for digest in store.digests_without_embedding(budget as u32)? {
        let vector = embedder.embed(&digest_text(&digest));
        store.set_digest_embedding(digest.id, &vector)?;
        done += 1;
    }

    Ok(done)
}

/// Run the Embed worker's full batch: drain the `embed` queue up to
/// `WORKER_BATCH_LIMIT`, then spend any remaining budget on the catch-up
/// pass. `should_stop` is polled between tasks (signal handler / caller).
pub fn run_embed_batch(store: &mut Store, embedder: &dyn EmbeddingProvider, should_stop: &dyn Fn() -> bool) -> WorkerResult<EmbedStats> {
    let mut stats = EmbedStats::default();

    while stats.queue_processed < WORKER_BATCH_LIMIT && !should_stop() {
        let Some(task) = agentkits_memory_queue::claim_one(store, TaskType::Embed)? else {
            break;
        };
        match embed_claimed_target(store, embedder, &task.target_table, &task.target_id) {
            Ok(_) => agentkits_memory_queue::complete(store, task.id)?,
            Err(e) => {
                tracing::warn!(error = %e, task_id = task.id, "embed task failed");
                agentkits_memory_queue::retry_or_fail(store, task.id, task.retry_count)?;
            }
        }
        stats.queue_processed += 1;
    }

    let remaining = WORKER_BATCH_LIMIT.saturating_sub(stats.queue_processed);
    if remaining > 0 && !should_stop() {
        stats.catch_up_processed = catch_up_embeddings(store, embedder, remaining)?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkits_memory_providers::LocalEmbeddingProvider;
    use agentkits_memory_store::NewObservation;

    fn observation(store: &Store, id: &str) -> Observation {
        store
            .insert_observation(NewObservation {
                id: id.to_string(),
                session_id: "s1".into(),
                project: "proj".into(),
                tool_name: "Read".into(),
                tool_input: "{}".into(),
                tool_response: "{}".into(),
                cwd: "/tmp".into(),
                timestamp: 1000,
                r#type: agentkits_memory_core::ObservationType::Read,
                title: "Read a file".into(),
                subtitle: "sub".into(),
                narrative: "narrative".into(),
                facts: vec![],
                concepts: vec![],
                prompt_number: Some(1),
                files_read: vec![],
                files_modified: vec![],
                content_hash: format!("hash-{id}"),
            })
            .unwrap()
    }

    #[test]
    fn catch_up_embeds_observation_without_embedding() {
        let mut store = Store::open_in_memory().unwrap();
        observation(&store, "obs1");
        let embedder = LocalEmbeddingProvider::default();

        let stats = run_embed_batch(&mut store, &embedder, &|| false).unwrap();
        assert_eq!(stats.catch_up_processed, 1);

        let obs = store.get_observation("obs1").unwrap().unwrap();
        assert!(obs.embedding.is_some());
    }

    #[test]
    fn queued_embed_task_is_processed_and_completed() {
        let mut store = Store::open_in_memory().unwrap();
        observation(&store, "obs1");
        agentkits_memory_queue::enqueue(&store, TaskType::Embed, "observations", "obs1", 1000).unwrap();
        let embedder = LocalEmbeddingProvider::default();

        let stats = run_embed_batch(&mut store, &embedder, &|| false).unwrap();
        assert_eq!(stats.queue_processed, 1);
        assert!(!agentkits_memory_queue::has_pending(&store, TaskType::Embed).unwrap());
    }
}
