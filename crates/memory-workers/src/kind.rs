// crates/memory-workers/src/kind.rs
use agentkits_memory_core::TaskType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKind {
    Embed,
    Enrich,
    Compress,
}

impl WorkerKind {
    /// Name used for the lock file: `<name>-worker.lock`.
    pub fn lock_name(&self) -> &'static str {
        match self {
            WorkerKind::Embed => "embed",
            WorkerKind::Enrich => "enrich",
            WorkerKind::Compress => "compress",
        }
    }

    /// Subcommand argv[1] used to re-exec the binary as this worker kind.
    pub fn subcommand(&self) -> &'static str {
        match self {
            WorkerKind::Embed => "embed-session",
            WorkerKind::Enrich => "enrich-session",
            WorkerKind::Compress => "compress-session",
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            WorkerKind::Embed => TaskType::Embed,
            WorkerKind::Enrich => TaskType::Enrich,
            WorkerKind::Compress => TaskType::Compress,
        }
    }
}
