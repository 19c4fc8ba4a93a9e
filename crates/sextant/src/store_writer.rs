//! Background store writer for parallel indexing.
//!
//! Parser workers are CPU-bound and share no state; their results cross a
//! bounded channel to a single background thread that owns a database
//! connection and executes one transaction per file. Serializing writes is
//! required by the embedded relational engine and linearizes updates to
//! any given file.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  Parser pool (rayon)     │  Writer thread                  │
//! │  ──────────────────      │  ─────────────                  │
//! │  read + hash + extract   │  recv() from bounded channel    │
//! │  send(ParsedFile) ───────┼─> upsert_file (one txn each)    │
//! │  ...                     │  count per-file errors          │
//! │  drop sender             │  return WriteStats              │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread::JoinHandle;

use tracing::{debug, error, warn};

use crate::db::Index;
use crate::error::{Error, IndexError, Result};
use crate::parallel::ParsedFile;
use crate::types::ProjectId;

/// Statistics from a writer run.
#[derive(Debug, Default, Clone)]
pub struct WriteStats {
    /// Files written
    pub files_written: usize,
    /// Symbols written
    pub symbols_written: usize,
    /// References written
    pub refs_written: usize,
    /// Per-file storage errors (rolled back and skipped)
    pub errors: Vec<IndexError>,
}

/// A background writer draining parsed files into the store.
///
/// Owns the sending end of a bounded channel; [`finish`](Self::finish)
/// drops the sender and joins the thread.
pub struct StoreWriter {
    sender: SyncSender<ParsedFile>,
    handle: JoinHandle<Result<WriteStats>>,
}

impl StoreWriter {
    /// Channel bound: enough to keep the writer busy without buffering the
    /// whole tree in memory.
    const CHANNEL_BOUND: usize = 128;

    /// Spawn the writer thread against its own connection to `db_path`.
    #[must_use]
    pub fn spawn(db_path: PathBuf, project: ProjectId) -> Self {
        let (sender, receiver) = std::sync::mpsc::sync_channel(Self::CHANNEL_BOUND);

        let handle = std::thread::spawn(move || Self::writer_thread(&db_path, project, &receiver));

        Self { sender, handle }
    }

    /// Send one parsed file to the writer, blocking when the channel is
    /// full. A disconnected channel (writer thread died) drops the file
    /// and logs.
    pub fn send(&self, parsed: ParsedFile) {
        if let Err(e) = self.sender.send(parsed) {
            error!(
                file = %e.0.rel_path,
                "Failed to send to store writer (receiver disconnected)"
            );
        }
    }

    /// Close the channel, wait for the writer to drain, and return its
    /// statistics.
    pub fn finish(self) -> Result<WriteStats> {
        drop(self.sender);

        match self.handle.join() {
            Ok(result) => result,
            Err(panic_payload) => {
                let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    format!("store writer thread panicked: {s}")
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    format!("store writer thread panicked: {s}")
                } else {
                    "store writer thread panicked with unknown payload".to_string()
                };
                error!(panic_msg = %msg, "Background store writer panicked");
                Err(Error::Internal(msg))
            }
        }
    }

    fn writer_thread(
        db_path: &std::path::Path,
        project: ProjectId,
        receiver: &Receiver<ParsedFile>,
    ) -> Result<WriteStats> {
        let db = Index::open(db_path)?;
        let mut stats = WriteStats::default();

        while let Ok(parsed) = receiver.recv() {
            match db.upsert_file(project, &parsed) {
                Ok((_, symbols, refs)) => {
                    stats.files_written += 1;
                    stats.symbols_written += symbols;
                    stats.refs_written += refs;
                }
                Err(e) => {
                    // One bad file must not stop the run; its transaction
                    // rolled back and any prior row for it is intact.
                    warn!(file = %parsed.rel_path, error = %e, "Failed to write file");
                    stats
                        .errors
                        .push(IndexError::storage_error(
                            PathBuf::from(&parsed.rel_path),
                            e.to_string(),
                        ));
                }
            }
        }

        debug!(
            files = stats.files_written,
            symbols = stats.symbols_written,
            refs = stats.refs_written,
            errors = stats.errors.len(),
            "Store writer finished"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;
    use tempfile::TempDir;

    fn parsed(path: &str) -> ParsedFile {
        ParsedFile {
            rel_path: path.to_string(),
            lang: Language::Rust,
            sha256: format!("sha-{path}"),
            size_bytes: 10,
            mtime_unix: 1_700_000_000,
            symbols: vec![],
            refs: vec![],
        }
    }

    #[test]
    fn writer_drains_channel_and_reports_stats() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("index.db");

        let index = Index::open(&db_path).unwrap();
        let project = index.ensure_project("/repo").unwrap();
        drop(index);

        let writer = StoreWriter::spawn(db_path.clone(), project);
        for i in 0..7 {
            writer.send(parsed(&format!("src/file{i}.rs")));
        }
        let stats = writer.finish().unwrap();

        assert_eq!(stats.files_written, 7);
        assert!(stats.errors.is_empty());

        let index = Index::open(&db_path).unwrap();
        assert_eq!(index.all_files(project).unwrap().len(), 7);
    }

    #[test]
    fn empty_run_finishes_cleanly() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("index.db");
        drop(Index::open(&db_path).unwrap());

        let writer = StoreWriter::spawn(db_path, ProjectId::from(1));
        let stats = writer.finish().unwrap();
        assert_eq!(stats.files_written, 0);
    }
}
