// crates/memory-workers/src/spawn.rs
//! Detached-subprocess spawning (spec §4.5): a handler re-execs the current
//! binary as a worker with stdio fully detached, so its own hook call
//! returns immediately.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::kind::WorkerKind;

/// Spawn `kind` as a detached worker over `cwd`. Does not wait for it.
pub fn spawn_worker(kind: WorkerKind, cwd: &Path) -> std::io::Result<()> {
    let exe = std::env::current_exe()?;
    Command::new(exe)
        .arg(kind.subcommand())
        .arg(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}
