// crates/memory-context/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Store(#[from] agentkits_memory_store::StoreError),
}

pub type ContextResult<T> = Result<T, ContextError>;
