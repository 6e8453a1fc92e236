// crates/memory-workers/src/watchdog.rs
//! 5-minute watchdog thread: an unconditional upper bound on a worker's
//! lifetime, independent of whatever it's doing (spec §4.5, §5). Polls a
//! cancel flag in short slices, mirroring the poll-with-deadline shape used
//! for subprocess waits elsewhere in this pipeline.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use agentkits_memory_core::queue_constants::WATCHDOG_SECS;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct Watchdog {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// `lock_path` is removed before the process is killed, so a fired
    /// watchdog doesn't leave a lock no live process will ever clear.
    pub fn start(lock_path: PathBuf) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_thread = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(WATCHDOG_SECS);
            while Instant::now() < deadline {
                if cancel_thread.load(Ordering::SeqCst) {
                    return;
                }
                thread::sleep(POLL_INTERVAL);
            }
            if !cancel_thread.load(Ordering::SeqCst) {
                tracing::error!(lock_path = %lock_path.display(), "worker watchdog fired, terminating");
                let _ = std::fs::remove_file(&lock_path);
                std::process::exit(1);
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Stop the watchdog cleanly. Called once the worker's own loop has
    /// finished (or is about to remove the lock itself).
    pub fn cancel(mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
