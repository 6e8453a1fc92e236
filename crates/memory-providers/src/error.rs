// crates/memory-providers/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to spawn provider process: {0}")]
    Spawn(String),

    #[error("provider request failed: {0}")]
    Request(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
