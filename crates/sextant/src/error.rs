//! Error types for Sextant operations.
//!
//! Errors split into two layers:
//!
//! - **`Error`**: top-level failures that halt an operation (database open,
//!   bad configuration, lock contention, malformed queries).
//! - **`IndexError`**: file-level failures that are collected into run
//!   statistics but never halt indexing.
//!
//! ## Propagation policy
//!
//! The indexer aggregates per-file errors and keeps going; a malformed file
//! must not prevent indexing the rest of the tree. The navigator surfaces
//! query errors to the caller as [`Error::BadRequest`] on that operation
//! only. The watcher logs errors and continues.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Sextant operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Sextant operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tree-sitter grammar or query infrastructure failed
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration: missing state dir, malformed config document,
    /// bad source roots. Fatal on startup, never during queries.
    #[error("configuration error: {0}")]
    Config(String),

    /// Another live process holds the writable index for this repository
    #[error("index is locked by a running writer (pid {pid}); retry after it exits")]
    Locked {
        /// Process id recorded in the writer state file
        pid: u32,
    },

    /// Malformed query from a client: neither position nor name, identifier
    /// not found at position, unknown language tag.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Invariant violation inside the engine
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error encountered while indexing a specific file.
///
/// Collected during indexing; the run continues with remaining files and
/// reports all errors at the end.
#[derive(Debug, Clone)]
pub struct IndexError {
    /// Path to the file that failed
    pub path: PathBuf,
    /// Category of the error
    pub kind: IndexErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for IndexError {}

/// Categorization of per-file indexing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorKind {
    /// Source file could not be parsed
    ParseFailed,
    /// File content is not valid UTF-8
    EncodingError,
    /// Could not read the file from disk
    IoError,
    /// Per-file transaction failed and was rolled back
    StorageError,
}

impl std::fmt::Display for IndexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailed => write!(f, "parse failed"),
            Self::EncodingError => write!(f, "encoding error"),
            Self::IoError => write!(f, "I/O error"),
            Self::StorageError => write!(f, "storage error"),
        }
    }
}

impl IndexError {
    /// Create a new indexing error.
    #[must_use]
    pub fn new(path: PathBuf, kind: IndexErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create a parse error for a file.
    #[must_use]
    pub fn parse_failed(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(path, IndexErrorKind::ParseFailed, message)
    }

    /// Create an encoding error for a file.
    #[must_use]
    pub fn encoding_error(path: PathBuf) -> Self {
        Self::new(
            path,
            IndexErrorKind::EncodingError,
            "file is not valid UTF-8",
        )
    }

    /// Create an I/O error for a file.
    #[must_use]
    pub fn io_error(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, IndexErrorKind::IoError, error.to_string())
    }

    /// Create a storage error for a file.
    #[must_use]
    pub fn storage_error(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(path, IndexErrorKind::StorageError, message)
    }

    /// Categorize a top-level error for per-file collection.
    #[must_use]
    pub fn from_error(path: PathBuf, error: &Error) -> Self {
        let kind = match error {
            Error::Io(_) => IndexErrorKind::IoError,
            Error::Storage(_) => IndexErrorKind::StorageError,
            _ => IndexErrorKind::ParseFailed,
        };
        Self::new(path, kind, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_error_display_includes_path_and_kind() {
        let error = IndexError::parse_failed(PathBuf::from("src/main.go"), "unexpected token");

        let display = error.to_string();
        assert!(display.contains("src/main.go"));
        assert!(display.contains("unexpected token"));
        assert!(display.contains("parse failed"));
    }

    #[test]
    fn from_error_categorizes_io() {
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = IndexError::from_error(PathBuf::from("a.rs"), &io);
        assert_eq!(err.kind, IndexErrorKind::IoError);
    }

    #[test]
    fn locked_error_names_the_pid() {
        let err = Error::Locked { pid: 4242 };
        assert!(err.to_string().contains("4242"));
    }
}
