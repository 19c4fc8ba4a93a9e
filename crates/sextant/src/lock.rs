//! Single-writer advisory lock for the index.
//!
//! Only one engine instance per repository may hold the index for writing.
//! Presence is advertised through `.sextant/writer.json`, a small state file
//! carrying the live process id and a start timestamp. A second instance
//! probes whether the recorded owner is still alive and refuses writable
//! operation while it is. Stale records (dead pid, corrupt content) are
//! silently removed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Name of the writer state file inside the state directory.
pub const WRITER_FILE: &str = "writer.json";

/// Contents of the writer state file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriterState {
    pid: u32,
    started_at: i64,
}

/// Held while this process owns the writable index.
///
/// Dropping the guard removes the state file.
#[derive(Debug)]
pub struct WriterLock {
    path: PathBuf,
}

impl WriterLock {
    /// Acquire the writer lock for a state directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] when another live process holds the lock.
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_dir)?;
        let path = state_dir.join(WRITER_FILE);

        if let Some(existing) = read_state(&path) {
            if existing.pid != std::process::id() && process_alive(existing.pid) {
                return Err(Error::Locked { pid: existing.pid });
            }
            debug!(pid = existing.pid, "Removing stale writer state");
            let _ = std::fs::remove_file(&path);
        }

        let state = WriterState {
            pid: std::process::id(),
            started_at: now_unix(),
        };
        let raw = serde_json::to_string(&state)
            .map_err(|e| Error::Internal(format!("serializing writer state: {e}")))?;
        std::fs::write(&path, raw)?;

        Ok(Self { path })
    }

    /// Whether a live writer other than this process currently holds the
    /// lock for `state_dir`.
    #[must_use]
    pub fn is_held(state_dir: &Path) -> bool {
        let path = state_dir.join(WRITER_FILE);
        read_state(&path)
            .is_some_and(|s| s.pid != std::process::id() && process_alive(s.pid))
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove writer state");
            }
        }
    }
}

/// Read and parse the writer state file. Corrupt content reads as absent.
fn read_state(path: &Path) -> Option<WriterState> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Corrupt writer state, treating as stale");
            None
        }
    }
}

/// Probe whether a process with the given pid is currently running.
fn process_alive(pid: u32) -> bool {
    let mut system = System::new();
    let target = Pid::from_u32(pid);
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[target]),
        true,
        ProcessRefreshKind::nothing(),
    );
    system.process(target).is_some()
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_writes_state_and_drop_removes_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(WRITER_FILE);

        {
            let _lock = WriterLock::acquire(dir.path()).unwrap();
            assert!(path.exists());

            let state = read_state(&path).unwrap();
            assert_eq!(state.pid, std::process::id());
            assert!(state.started_at > 0);
        }

        assert!(!path.exists());
    }

    #[test]
    fn own_pid_does_not_count_as_held() {
        let dir = TempDir::new().unwrap();
        let _lock = WriterLock::acquire(dir.path()).unwrap();
        assert!(!WriterLock::is_held(dir.path()));
    }

    #[test]
    fn stale_record_is_silently_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(WRITER_FILE);

        // A pid far above any real pid table; certainly dead.
        std::fs::write(&path, r#"{"pid": 4000000000, "started_at": 1}"#).unwrap();

        let _lock = WriterLock::acquire(dir.path()).unwrap();
        let state = read_state(&path).unwrap();
        assert_eq!(state.pid, std::process::id());
    }

    #[test]
    fn corrupt_record_is_silently_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(WRITER_FILE);
        std::fs::write(&path, "not json at all").unwrap();

        let _lock = WriterLock::acquire(dir.path()).unwrap();
        assert!(read_state(&path).is_some());
    }

    #[test]
    fn live_owner_blocks_acquisition() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(WRITER_FILE);

        // Use our own pid as the "other" owner by writing the file directly,
        // then patching the pid comparison via a different process id is not
        // possible in-process; instead verify Locked fires for pid 1 (init),
        // which is always alive on Unix.
        #[cfg(unix)]
        {
            std::fs::write(&path, r#"{"pid": 1, "started_at": 1}"#).unwrap();
            match WriterLock::acquire(dir.path()) {
                Err(Error::Locked { pid }) => assert_eq!(pid, 1),
                other => panic!("expected Locked, got {other:?}"),
            }
        }
    }
}
