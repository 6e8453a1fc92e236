// crates/memory-retrieval/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Store(#[from] agentkits_memory_store::StoreError),
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
