// crates/memory-workers/src/lib.rs
//! L4: the three background processors (Embed, Enrich, Compress) that do
//! all the work handlers don't do inline. Grounded on
//! `claude-view-db::indexer`'s scan/claim/process loop shape and
//! `claude-view-server-sidecar`'s reliance on `libc` for process-liveness
//! primitives.

pub mod compress;
pub mod embed;
pub mod enrich;
pub mod error;
pub mod kind;
pub mod lock;
pub mod signal;
pub mod spawn;
pub mod watchdog;

use std::path::Path;

pub use error::{WorkerError, WorkerResult};
pub use kind::WorkerKind;
pub use lock::WorkerLock;
pub use spawn::spawn_worker;

use agentkits_memory_providers::{AiProvider, EmbeddingProvider};
use agentkits_memory_store::Store;

/// Run one full worker invocation: acquire the lock (exit quietly if
/// already held), install the watchdog and signal handlers, drain one
/// batch, then release everything (spec §4.5 steps 1-5).
///
/// Returns `None` if the lock could not be acquired (another instance of
/// this worker kind is already running).
pub fn run_worker_once(
    memory_dir: &Path,
    kind: WorkerKind,
    store: &mut Store,
    ai: &dyn AiProvider,
    embedder: &dyn EmbeddingProvider,
) -> WorkerResult<Option<WorkerOutcome>> {
    let Some(lock) = WorkerLock::acquire(memory_dir, kind.lock_name()) else {
        tracing::debug!(worker = kind.lock_name(), "lock already held, exiting quietly");
        return Ok(None);
    };

    signal::install_handlers();
    let watchdog = watchdog::Watchdog::start(lock.path().to_path_buf());
    let should_stop = || signal::shutdown_requested();

    let outcome = match kind {
        WorkerKind::Embed => {
            let stats = embed::run_embed_batch(store, embedder, &should_stop)?;
            WorkerOutcome::Embed(stats)
        }
        WorkerKind::Enrich => {
            let stats = enrich::run_enrich_batch(store, ai, &should_stop)?;
            WorkerOutcome::Enrich(stats)
        }
        WorkerKind::Compress => {
            let stats = compress::run_compress_batch(store, ai, &should_stop)?;
            WorkerOutcome::Compress(stats)
        }
    };

    watchdog.cancel();
    drop(lock);
    Ok(Some(outcome))
}

#[derive(Debug, Clone, Copy)]
pub enum WorkerOutcome {
    Embed(embed::EmbedStats),
    Enrich(enrich::EnrichStats),
    Compress(compress::CompressStats),
}
