// crates/memory-core/src/queue_constants.rs
//! Constants shared by the queue and worker crates so they cannot drift
//! apart, per spec §4.4/§4.5.

/// A task-queue row that reaches this retry count transitions to `failed`
/// and is never reclaimed (spec §3 invariant 5, §4.4).
pub const MAX_RETRIES: u32 = 3;

/// Per-run batch limit for a worker's drain loop (spec §4.5).
pub const WORKER_BATCH_LIMIT: usize = 200;

/// Upper bound on a worker's lifetime before it self-terminates, even if
/// work remains (spec §4.5, §5).
pub const WATCHDOG_SECS: u64 = 5 * 60;

/// Dedup window for observations (spec §3).
pub const OBSERVATION_DEDUP_WINDOW_MS: u64 = 60_000;

/// Dedup window for user prompts and for imports (spec §3, §4.8).
pub const PROMPT_DEDUP_WINDOW_MS: u64 = 5 * 60_000;

/// Resume-detection window: a new session in the same project within this
/// many milliseconds of a prior one records it as `parent_session_id`
/// (spec §3).
pub const RESUME_DETECTION_WINDOW_MS: u64 = 30 * 60_000;
