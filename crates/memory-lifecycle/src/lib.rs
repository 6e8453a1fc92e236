// crates/memory-lifecycle/src/lib.rs
//! The lifecycle manager (L7, spec §4.8): on-demand compaction, a
//! statistics reporter, and project export/import. Nothing in this crate
//! runs on a timer — the CLI's `lifecycle`/`lifecycle-stats`/`export`/
//! `import` subcommands are the only callers.

mod compaction;
mod config;
mod error;
mod export;
mod import;
mod stats;

pub use compaction::{run_lifecycle, LifecycleReport};
pub use config::{LifecycleConfig, LIFECYCLE_BATCH_LIMIT};
pub use error::{LifecycleError, LifecycleResult};
pub use export::{export_project, ExportDocument, ExportedSession, EXPORT_FORMAT_VERSION};
pub use import::{import_project, ImportReport};
pub use stats::{collect_stats, LifecycleStats};
