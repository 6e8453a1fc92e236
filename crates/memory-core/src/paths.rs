// crates/memory-core/src/paths.rs
//! Centralized path functions for all on-disk state, single source of
//! truth per spec §6's on-disk layout: `<project>/<memoryDir>/...`.

use std::path::{Path, PathBuf};

/// Default directory name for project-local memory state.
pub const DEFAULT_MEMORY_DIR: &str = ".claude/memory";

/// Root directory for this project's memory state: `<project>/<memoryDir>`.
pub fn memory_dir(project_root: &Path, memory_dir_name: Option<&str>) -> PathBuf {
    project_root.join(memory_dir_name.unwrap_or(DEFAULT_MEMORY_DIR))
}

/// SQLite database file: `<memory_dir>/memory.db`.
pub fn db_path(memory_dir: &Path) -> PathBuf {
    memory_dir.join("memory.db")
}

/// Persisted settings file: `<memory_dir>/settings.json`.
pub fn settings_path(memory_dir: &Path) -> PathBuf {
    memory_dir.join("settings.json")
}

/// PID lock file for one of the three worker kinds.
pub fn worker_lock_path(memory_dir: &Path, worker: &str) -> PathBuf {
    memory_dir.join(format!("{worker}-worker.lock"))
}

/// On-disk cache directory used by the embedding provider.
pub fn embeddings_cache_dir(memory_dir: &Path) -> PathBuf {
    memory_dir.join("embeddings-cache")
}

/// Derive a project label from a working directory: its last path segment,
/// defaulting to `"unknown"` for a root or otherwise segment-less path.
pub fn project_from_cwd(cwd: &Path) -> String {
    cwd.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dir_defaults() {
        let root = Path::new("/home/user/proj");
        assert_eq!(memory_dir(root, None), root.join(".claude/memory"));
    }

    #[test]
    fn memory_dir_custom() {
        let root = Path::new("/home/user/proj");
        assert_eq!(memory_dir(root, Some(".mem")), root.join(".mem"));
    }

    #[test]
    fn db_and_settings_paths() {
        let dir = Path::new("/tmp/mem");
        assert_eq!(db_path(dir), dir.join("memory.db"));
        assert_eq!(settings_path(dir), dir.join("settings.json"));
    }

    #[test]
    fn project_from_cwd_normal() {
        assert_eq!(project_from_cwd(Path::new("/home/user/my-project")), "my-project");
    }

    #[test]
    fn project_from_cwd_root_is_unknown() {
        assert_eq!(project_from_cwd(Path::new("/")), "unknown");
    }
}
