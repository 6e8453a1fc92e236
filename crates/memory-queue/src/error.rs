// crates/memory-queue/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("store error: {0}")]
    Store(#[from] agentkits_memory_store::StoreError),

    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

pub type QueueResult<T> = Result<T, QueueError>;
