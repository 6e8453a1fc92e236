// crates/memory-workers/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Store(#[from] agentkits_memory_store::StoreError),

    #[error(transparent)]
    Queue(#[from] agentkits_memory_queue::QueueError),

    #[error("lock directory is not accessible: {0}")]
    Lock(#[from] std::io::Error),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
