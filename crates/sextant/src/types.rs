//! Domain types for the Sextant index.
//!
//! These types represent the core domain model:
//! - **Entities**: `FileRecord`, `Definition`, `Usage` (stored in database)
//! - **Transient**: `ExtractedSymbol`, `ExtractedRef` (parse results, see `parallel`)
//! - **Results**: `IndexStats`, `ProjectInfo` (operation results)
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Language | Enum not String | Closed set of six; `get_parser(lang)` is total |
//! | Kind codes | Stable integers | Persisted in rows; ordering used for ranking |
//! | Lines / columns | 1-based / 0-based | Matches the external interface everywhere |
//! | sha256 | Hex string | Cheap equality; readable in the database |

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::IndexError;

// ============================================================================
// Strongly-typed ID wrappers
// ============================================================================

/// A strongly-typed project ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub i64);

impl ProjectId {
    /// Extract the raw i64 value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strongly-typed file ID to prevent mixing with project or symbol IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub i64);

impl FileId {
    /// Extract the raw i64 value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for FileId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Supported source languages.
///
/// The set is closed: every variant has a grammar, a capture query, and a
/// builtin table registered in `languages`. Adding a language means adding
/// all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Go source files (`.go`)
    Go,
    /// Java source files (`.java`)
    Java,
    /// Rust source files (`.rs`)
    Rust,
    /// Python source files (`.py`, `.pyi`)
    Python,
    /// TypeScript source files (`.ts`, `.tsx`, `.mts`, `.cts`)
    TypeScript,
    /// JavaScript source files (`.js`, `.jsx`, `.mjs`, `.cjs`)
    JavaScript,
}

impl Language {
    /// All supported languages, in tag order.
    pub const ALL: [Self; 6] = [
        Self::Go,
        Self::Java,
        Self::Rust,
        Self::Python,
        Self::TypeScript,
        Self::JavaScript,
    ];

    /// Detect language from file extension.
    ///
    /// Returns `None` for unrecognized extensions; callers skip such files
    /// entirely.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "rs" => Some(Self::Rust),
            "py" | "pyi" => Some(Self::Python),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            _ => None,
        }
    }

    /// Detect language from a file path.
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse a language tag (the same strings produced by [`Self::as_str`]).
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "rust" => Some(Self::Rust),
            "python" => Some(Self::Python),
            "typescript" => Some(Self::TypeScript),
            "javascript" => Some(Self::JavaScript),
            _ => None,
        }
    }

    /// Convert to the persisted tag string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Java => "java",
            Self::Rust => "rust",
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
        }
    }

    /// Whether blocks in this language are delimited by indentation rather
    /// than braces. Drives block-end derivation.
    #[must_use]
    pub fn uses_indent_blocks(&self) -> bool {
        matches!(self, Self::Python)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbol kinds, persisted as stable integer codes.
///
/// The codes double as a ranking key: navigator results order by ascending
/// code after the bias file, so types and functions sort ahead of locals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Fallback for unmapped captures
    Unknown,
    /// Package or namespace declaration
    Package,
    /// Class declaration
    Class,
    /// Interface declaration
    Interface,
    /// Struct declaration
    Struct,
    /// Enum declaration
    Enum,
    /// Free function
    Function,
    /// Method (function owned by a type)
    Method,
    /// Property (accessor-backed member)
    Property,
    /// Field (plain data member)
    Field,
    /// Local or module-level variable
    Variable,
    /// Constant
    Constant,
    /// Constructor
    Constructor,
    /// Type alias
    TypeAlias,
    /// Trait (Rust)
    Trait,
    /// Module (Rust `mod`, Python module)
    Module,
}

impl SymbolKind {
    /// The persisted integer code.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Package => 1,
            Self::Class => 2,
            Self::Interface => 3,
            Self::Struct => 4,
            Self::Enum => 5,
            Self::Function => 6,
            Self::Method => 7,
            Self::Property => 8,
            Self::Field => 9,
            Self::Variable => 10,
            Self::Constant => 11,
            Self::Constructor => 12,
            Self::TypeAlias => 13,
            Self::Trait => 14,
            Self::Module => 15,
        }
    }

    /// Decode a persisted integer code. Unknown codes map to [`Self::Unknown`].
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Package,
            2 => Self::Class,
            3 => Self::Interface,
            4 => Self::Struct,
            5 => Self::Enum,
            6 => Self::Function,
            7 => Self::Method,
            8 => Self::Property,
            9 => Self::Field,
            10 => Self::Variable,
            11 => Self::Constant,
            12 => Self::Constructor,
            13 => Self::TypeAlias,
            14 => Self::Trait,
            15 => Self::Module,
            _ => Self::Unknown,
        }
    }

    /// Resolve a `def.<suffix>` capture suffix to a kind.
    ///
    /// Returns `None` for suffixes that are not definition kinds (e.g. the
    /// `container` capture family).
    #[must_use]
    pub fn from_capture_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "package" => Some(Self::Package),
            "class" => Some(Self::Class),
            "interface" => Some(Self::Interface),
            "struct" => Some(Self::Struct),
            "enum" => Some(Self::Enum),
            "function" | "func" => Some(Self::Function),
            "method" => Some(Self::Method),
            "property" => Some(Self::Property),
            "field" => Some(Self::Field),
            "variable" | "var" => Some(Self::Variable),
            "constant" | "const" => Some(Self::Constant),
            "constructor" | "ctor" => Some(Self::Constructor),
            "type_alias" => Some(Self::TypeAlias),
            "trait" => Some(Self::Trait),
            "module" => Some(Self::Module),
            _ => None,
        }
    }

    /// Display string (also the serde snake_case form).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Package => "package",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::Field => "field",
            Self::Variable => "variable",
            Self::Constant => "constant",
            Self::Constructor => "constructor",
            Self::TypeAlias => "type_alias",
            Self::Trait => "trait",
            Self::Module => "module",
        }
    }

    /// Type-like kinds: targets of `new`, `extends`, type annotations.
    #[must_use]
    pub fn is_type_like(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Struct | Self::Enum | Self::TypeAlias | Self::Trait
        )
    }

    /// Member-like kinds: targets of `.name` access.
    #[must_use]
    pub fn is_member_like(self) -> bool {
        matches!(self, Self::Field | Self::Property | Self::Method)
    }

    /// Callable kinds: targets of `name(...)`.
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method | Self::Constructor)
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference kinds - how a symbol is used at a reference site.
///
/// Persisted as stable integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// Anything that doesn't fit the other kinds
    Other,
    /// Function or method call
    Call,
    /// Plain read of a value or member
    Read,
    /// Assignment target
    Write,
    /// Import statement
    Import,
    /// Type position (annotation, generic argument, constructor type)
    TypeRef,
    /// Inheritance or interface implementation
    Inherit,
    /// Annotation / decorator / attribute macro
    Annotation,
}

impl RefKind {
    /// The persisted integer code.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Other => 0,
            Self::Call => 1,
            Self::Read => 2,
            Self::Write => 3,
            Self::Import => 4,
            Self::TypeRef => 5,
            Self::Inherit => 6,
            Self::Annotation => 7,
        }
    }

    /// Decode a persisted integer code. Unknown codes map to [`Self::Other`].
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Call,
            2 => Self::Read,
            3 => Self::Write,
            4 => Self::Import,
            5 => Self::TypeRef,
            6 => Self::Inherit,
            7 => Self::Annotation,
            _ => Self::Other,
        }
    }

    /// Display string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::Call => "call",
            Self::Read => "read",
            Self::Write => "write",
            Self::Import => "import",
            Self::TypeRef => "type_ref",
            Self::Inherit => "inherit",
            Self::Annotation => "annotation",
        }
    }
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Core Entities
// ============================================================================

/// A source span: 1-based inclusive lines, 0-based columns.
///
/// For identifier-only spans `end_col == start_col + name.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Starting line (1-based)
    pub start_line: u32,
    /// Starting column (0-based)
    pub start_col: u32,
    /// Ending line (1-based, inclusive)
    pub end_line: u32,
    /// Ending column (0-based)
    pub end_col: u32,
}

impl Span {
    /// Create a span, returning `None` when the end precedes the start.
    #[must_use]
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Option<Self> {
        if end_line < start_line || (end_line == start_line && end_col < start_col) {
            return None;
        }
        Some(Self {
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// A single-position span covering `name` starting at `(line, col)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_identifier(line: u32, col: u32, name: &str) -> Self {
        Self {
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col + name.len() as u32,
        }
    }

    /// Whether the 1-based line / 0-based column falls on this span's start
    /// line within its column range.
    #[must_use]
    pub fn contains_position(&self, line: u32, col: u32) -> bool {
        self.start_line == line && self.start_col <= col && col <= self.end_col
    }
}

/// A source file row in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Database primary key
    pub id: FileId,
    /// Path relative to the repository root (forward slashes)
    pub path: String,
    /// Detected language
    pub lang: Language,
    /// Hex SHA-256 of file bytes whose parse produced the stored rows
    pub sha256: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// File modification time (unix seconds)
    pub mtime_unix: i64,
    /// When this file was last indexed (unix seconds)
    pub indexed_at: i64,
}

/// A symbol definition as returned by navigator queries.
///
/// Joins the symbol row with its file's path and language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    /// Database primary key of the symbol row
    pub id: i64,
    /// Repo-relative path of the defining file
    pub path: String,
    /// Language of the defining file
    pub lang: Language,
    /// Symbol name
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Enclosing type/function name, empty when top-level
    pub container_name: String,
    /// Free-form declaration signature, when derivable
    pub signature: Option<String>,
    /// Full declaration span (block end line included)
    pub span: Span,
}

impl Definition {
    /// Graph node identity: `path:name:start_line`.
    #[must_use]
    pub fn node_id(&self) -> String {
        format!("{}:{}:{}", self.path, self.name, self.span.start_line)
    }

    /// Parent directory of the defining file.
    #[must_use]
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

/// A reference (usage) as returned by navigator queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Database primary key of the ref row
    pub id: i64,
    /// Repo-relative path of the referencing file
    pub path: String,
    /// Language of the referencing file
    pub lang: Language,
    /// Referenced name
    pub name: String,
    /// How the name is used at this site
    pub kind: RefKind,
    /// True when the target lives outside the project (imports and
    /// import-introduced names)
    pub is_external: bool,
    /// True when the name is in the language's builtin/prelude table
    pub is_builtin: bool,
    /// Structural relation: "inherits", "implements", "annotation", "prototype"
    pub relation: Option<String>,
    /// Receiver expression for member access, when a simple identifier
    pub receiver_type: Option<String>,
    /// Target type for inheritance relations
    pub target_type: Option<String>,
    /// Enclosing named scope at the usage site, empty when top-level
    pub context_container: String,
    /// Identifier span
    pub span: Span,
}

impl Usage {
    /// Parent directory of the referencing file.
    #[must_use]
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

/// A usage paired with its dependency score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredUsage {
    /// The underlying usage
    pub usage: Usage,
    /// Probability mass on the best (or primary) candidate, rounded to
    /// four decimals
    pub score: f64,
    /// Node id of the argmax candidate, when any candidate exists
    pub best_definition: Option<String>,
}

// ============================================================================
// Operation results
// ============================================================================

/// Statistics from a full index or reconcile run.
#[derive(Debug, Default)]
pub struct IndexStats {
    /// Files parsed and written
    pub indexed: usize,
    /// Symbols written
    pub symbols: usize,
    /// References written
    pub refs: usize,
    /// Files skipped because their hash was unchanged (reconcile only)
    pub skipped: usize,
    /// Files deleted because they disappeared from disk (reconcile only)
    pub deleted: usize,
    /// Per-file errors; never abort the run
    pub errors: Vec<IndexError>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Static facts about the open project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Absolute repository root
    pub repo_root: PathBuf,
    /// Declared source roots (repo-relative)
    pub source_roots: Vec<String>,
    /// Absolute path of the index database
    pub db_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_table_is_total_over_spec() {
        assert_eq!(Language::from_extension("go"), Some(Language::Go));
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("pyi"), Some(Language::Python));
        for ext in ["ts", "tsx", "mts", "cts"] {
            assert_eq!(Language::from_extension(ext), Some(Language::TypeScript));
        }
        for ext in ["js", "jsx", "mjs", "cjs"] {
            assert_eq!(Language::from_extension(ext), Some(Language::JavaScript));
        }
        assert_eq!(Language::from_extension("txt"), None);
        assert_eq!(Language::from_extension(""), None);
    }

    #[test]
    fn kind_codes_round_trip() {
        for code in 0..=15 {
            let kind = SymbolKind::from_code(code);
            assert_eq!(kind.code(), code);
        }
        assert_eq!(SymbolKind::from_code(99), SymbolKind::Unknown);
    }

    #[test]
    fn ref_kind_codes_round_trip() {
        for code in 0..=7 {
            let kind = RefKind::from_code(code);
            assert_eq!(kind.code(), code);
        }
        assert_eq!(RefKind::from_code(-1), RefKind::Other);
    }

    #[test]
    fn identifier_span_ends_after_name() {
        let span = Span::for_identifier(3, 5, "Config");
        assert_eq!(span.start_line, 3);
        assert_eq!(span.end_line, 3);
        assert_eq!(span.end_col, 11);
        assert!(span.contains_position(3, 5));
        assert!(span.contains_position(3, 11));
        assert!(!span.contains_position(3, 12));
        assert!(!span.contains_position(4, 5));
    }

    #[test]
    fn span_rejects_inverted_range() {
        assert!(Span::new(5, 0, 4, 0).is_none());
        assert!(Span::new(5, 8, 5, 2).is_none());
        assert!(Span::new(5, 2, 5, 2).is_some());
    }

    #[test]
    fn definition_dir_splits_on_last_slash() {
        let def = Definition {
            id: 1,
            path: "pkg/sub/a.go".to_string(),
            lang: Language::Go,
            name: "Foo".to_string(),
            kind: SymbolKind::Struct,
            container_name: String::new(),
            signature: None,
            span: Span::for_identifier(1, 5, "Foo"),
        };
        assert_eq!(def.dir(), "pkg/sub");
        assert_eq!(def.node_id(), "pkg/sub/a.go:Foo:1");
    }

    #[test]
    fn capture_suffix_maps_both_spellings() {
        assert_eq!(
            SymbolKind::from_capture_suffix("func"),
            Some(SymbolKind::Function)
        );
        assert_eq!(
            SymbolKind::from_capture_suffix("function"),
            Some(SymbolKind::Function)
        );
        assert_eq!(
            SymbolKind::from_capture_suffix("var"),
            Some(SymbolKind::Variable)
        );
        assert_eq!(SymbolKind::from_capture_suffix("name"), None);
    }
}
