// crates/memory-workers/src/lock.rs
//! PID lock file acquisition, spec §4.5 step 1: atomic create-exclusive,
//! stale-lock reclamation via a liveness probe.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use agentkits_memory_core::paths::worker_lock_path;

/// A held worker lock. Removes its file on drop (covers normal exit and
/// unwind from a propagated panic; SIGINT/SIGTERM are handled separately
/// via `crate::signal`, and the watchdog removes the file itself before
/// `process::exit`).
pub struct WorkerLock {
    path: PathBuf,
}

impl WorkerLock {
    /// Try to acquire the lock for `worker` (one of `"embed"`, `"enrich"`,
    /// `"compress"`) inside `memory_dir`. Returns `None` if another live
    /// process already holds it.
    pub fn acquire(memory_dir: &Path, worker: &str) -> Option<Self> {
        let path = worker_lock_path(memory_dir, worker);
        if create_exclusive(&path).is_ok() {
            return Some(Self { path });
        }

        // Someone already holds (or left behind) the lock file.
        let held_pid = read_pid(&path)?;
        if process_alive(held_pid) {
            return None;
        }

        // Stale lock: reclaim and retry once.
        let _ = std::fs::remove_file(&path);
        create_exclusive(&path).ok()?;
        Some(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkerLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn create_exclusive(path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    write!(file, "{}", std::process::id())?;
    Ok(())
}

fn read_pid(path: &Path) -> Option<i32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn process_alive(pid: i32) -> bool {
    // kill(pid, 0) sends no signal, only checks permission/existence.
    unsafe { libc::kill(pid, 0) == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_then_release_allows_reacquire() {
        let dir = TempDir::new().unwrap();
        {
            let lock = WorkerLock::acquire(dir.path(), "embed").unwrap();
            assert!(lock.path().exists());
        }
        assert!(WorkerLock::acquire(dir.path(), "embed").is_some());
    }

    #[test]
    fn second_acquire_while_held_fails() {
        let dir = TempDir::new().unwrap();
        let _held = WorkerLock::acquire(dir.path(), "enrich").unwrap();
        assert!(WorkerLock::acquire(dir.path(), "enrich").is_none());
    }

    #[test]
    fn stale_lock_from_dead_pid_is_reclaimed() {
        let dir = TempDir::new().unwrap();
        let path = worker_lock_path(dir.path(), "compress");
        // PID 1 is init on any live Unix system but almost certainly not
        // this test's own PID; pick a PID outside the plausible live range
        // instead so the liveness probe reliably reports dead.
        std::fs::write(&path, "999999").unwrap();
        assert!(WorkerLock::acquire(dir.path(), "compress").is_some());
    }
}
