// crates/memory-lifecycle/src/config.rs
//! The lifecycle manager's run configuration (spec §4.8). Unlike
//! `ContextConfig`, this isn't persisted in `settings.json` — the spec
//! scopes it to each on-demand `lifecycle` invocation, typically via CLI
//! flags defaulting to this struct's `Default` impl.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleConfig {
    pub compress_after_days: u32,
    pub archive_after_days: u32,
    pub auto_delete: bool,
    pub delete_after_days: u32,
    pub auto_vacuum: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            compress_after_days: 7,
            archive_after_days: 30,
            auto_delete: false,
            delete_after_days: 90,
            auto_vacuum: true,
        }
    }
}

pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Batch size for the compress-enqueue and archive-transition passes
/// (spec §4.8: "batch ≤ 100").
pub const LIFECYCLE_BATCH_LIMIT: u32 = 100;
