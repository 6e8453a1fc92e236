// crates/memory-workers/src/signal.rs
//! SIGINT/SIGTERM handling via raw `libc::signal` registration (spec §4.5
//! step 2, §5 cancellation semantics): a worker finishes its current task,
//! closes the database, and removes its lock before exiting.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_signal(_signum: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Install handlers for SIGINT and SIGTERM. Idempotent; safe to call once
/// per process near the start of a worker's run loop.
pub fn install_handlers() {
    unsafe {
        libc::signal(libc::SIGINT, handle_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, handle_signal as libc::sighandler_t);
    }
}

/// Whether a shutdown signal has arrived since the process started (or
/// since handlers were installed). Checked between queue-claim iterations.
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_false_before_any_signal() {
        assert!(!shutdown_requested());
    }
}
