//! Owned parse-result types passed from parser workers to the store writer.
//!
//! Parsing runs on a CPU-bound worker pool; results cross a channel to the
//! single writer thread. Everything here is owned data with no borrows into
//! the source text, so it can move between threads freely.

use std::path::PathBuf;

use crate::types::{Language, RefKind, Span, SymbolKind};

/// A symbol definition extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSymbol {
    /// Symbol name
    pub name: String,
    /// Resolved kind
    pub kind: SymbolKind,
    /// Enclosing scope name, empty when top-level
    pub container_name: String,
    /// Free-form declaration signature, when derivable
    pub signature: Option<String>,
    /// Full declaration span
    pub span: Span,
}

/// A reference extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRef {
    /// Referenced name
    pub name: String,
    /// How the name is used
    pub kind: RefKind,
    /// Structural relation, when any
    pub relation: Option<String>,
    /// Receiver expression for member access, when a simple identifier
    pub receiver_type: Option<String>,
    /// Target type for inheritance relations
    pub target_type: Option<String>,
    /// True when the target lives outside the project
    pub is_external: bool,
    /// True when the name is a language builtin
    pub is_builtin: bool,
    /// Enclosing named scope at the usage site
    pub context_container: String,
    /// Identifier span
    pub span: Span,
}

/// Everything extracted from a single file, ready for one transactional
/// upsert.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path relative to the repository root (forward slashes)
    pub rel_path: String,
    /// Detected language
    pub lang: Language,
    /// Hex SHA-256 of the parsed bytes
    pub sha256: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Modification time (unix seconds)
    pub mtime_unix: i64,
    /// Extracted definitions
    pub symbols: Vec<ExtractedSymbol>,
    /// Extracted references
    pub refs: Vec<ExtractedRef>,
}

/// A unit of indexing work discovered by the walker.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Absolute path on disk
    pub abs_path: PathBuf,
    /// Path relative to the repository root
    pub rel_path: String,
    /// Detected language
    pub lang: Language,
}
