// crates/memory-lifecycle/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Store(#[from] agentkits_memory_store::StoreError),
    #[error(transparent)]
    Queue(#[from] agentkits_memory_queue::QueueError),
    #[error("malformed export document: {0}")]
    MalformedExport(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
