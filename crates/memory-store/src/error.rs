// crates/memory-store/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("failed to determine cache directory")]
    NoCacheDir,

    #[error("failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),

    #[error("vector extension unavailable, using brute-force cosine fallback")]
    VectorExtensionUnavailable,
}

pub type StoreResult<T> = Result<T, StoreError>;
