// crates/memory-core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by core-layer helpers (paths, settings). Handlers never
/// propagate these past their own boundary — see spec §7.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to determine cache directory")]
    NoCacheDir,

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file {path}: {message}")]
    MalformedSettings { path: PathBuf, message: String },
}

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
