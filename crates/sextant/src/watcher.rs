//! File watcher: recursive subscription with bounded debouncing.
//!
//! One listener thread receives raw create/write/rename/remove events for
//! the recursively subscribed source roots. Each event records the
//! affected path in a pending set and re-arms a 200 ms debounce window;
//! when a path has been quiet that long it is drained and either
//! re-indexed (file exists), removed (file gone), or added to the watch
//! subscription (newly created directory).
//!
//! Cancellation flushes the pending set without re-arming.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::Sextant;

/// Quiescence window: a path is processed once it has seen no events for
/// this long.
pub const DEBOUNCE_MS: u64 = 200;

/// Poll interval of the drain loop.
const POLL_MS: u64 = 50;

/// Pending paths with their last-event timestamps.
///
/// The two states of the watcher's debounce machine: `idle` when the map
/// is empty, `armed` otherwise.
#[derive(Debug, Default)]
struct DebounceQueue {
    pending: HashMap<PathBuf, Instant>,
}

impl DebounceQueue {
    /// Record an event for a path, re-arming its window.
    fn record(&mut self, path: PathBuf) {
        self.pending.insert(path, Instant::now());
    }

    /// Drain the paths whose window has elapsed.
    fn take_ready(&mut self, window: Duration) -> Vec<PathBuf> {
        let now = Instant::now();
        let mut ready = Vec::new();
        self.pending.retain(|path, last| {
            if now.duration_since(*last) >= window {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });
        ready
    }

    /// Drain everything regardless of age. Used on cancellation.
    fn flush(&mut self) -> Vec<PathBuf> {
        self.pending.drain().map(|(path, _)| path).collect()
    }
}

/// Watch the engine's source roots until `stop` is set.
pub(crate) fn watch(engine: &mut Sextant, stop: &AtomicBool) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: std::result::Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| Error::Internal(format!("creating file watcher: {e}")))?;

    for root in engine.watch_roots() {
        match watcher.watch(&root, RecursiveMode::Recursive) {
            Ok(()) => info!(root = %root.display(), "Watching"),
            Err(e) => warn!(root = %root.display(), error = %e, "Failed to watch root"),
        }
    }

    let mut queue = DebounceQueue::default();
    let window = Duration::from_millis(DEBOUNCE_MS);

    loop {
        if stop.load(Ordering::Relaxed) {
            let remaining = queue.flush();
            debug!(flushed = remaining.len(), "Watcher stopping");
            process_paths(engine, &mut watcher, remaining);
            return Ok(());
        }

        match rx.recv_timeout(Duration::from_millis(POLL_MS)) {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    for path in event.paths {
                        queue.record(path);
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let remaining = queue.flush();
                process_paths(engine, &mut watcher, remaining);
                return Ok(());
            }
        }

        let ready = queue.take_ready(window);
        process_paths(engine, &mut watcher, ready);
    }
}

/// Handle a batch of quiesced paths.
fn process_paths(engine: &mut Sextant, watcher: &mut RecommendedWatcher, paths: Vec<PathBuf>) {
    for path in paths {
        // Ignore anything outside the repo or under an excluded directory.
        let Some(rel) = engine.relative_path(&path) else {
            continue;
        };
        if rel.split('/').any(Sextant::is_excluded_dir) {
            continue;
        }

        if path.is_dir() {
            // A newly created directory joins the subscription; children
            // arrive as their own events.
            if let Err(e) = watcher.watch(&path, RecursiveMode::Recursive) {
                debug!(path = %path.display(), error = %e, "Failed to watch new directory");
            }
            continue;
        }

        if path.exists() {
            match engine.index_single_file(&path) {
                Ok(true) => info!(file = %rel, "Re-indexed"),
                Ok(false) => {}
                Err(e) => warn!(file = %rel, error = %e, "Failed to re-index"),
            }
        } else {
            match engine.remove_single_file(&path) {
                Ok(true) => info!(file = %rel, "Removed from index"),
                Ok(false) => {}
                Err(e) => warn!(file = %rel, error = %e, "Failed to remove"),
            }
        }
    }
}
