//! Database schema and versioned migrations.

/// A single schema migration.
///
/// Migrations run in ascending version order inside one transaction each,
/// and record `(version, name, applied_at)` in the ledger.
pub(crate) struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// The migration ledger itself. Created unconditionally on open, outside
/// the versioned list, so it exists before the first migration runs.
pub(crate) const LEDGER: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL
);
";

/// Base schema, version 1.
const BASE_SCHEMA: &str = r"
-- One repository per database
CREATE TABLE projects (
    id INTEGER PRIMARY KEY,
    repo_root TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
);

-- Repo-relative subtrees the indexer may walk (ordered, duplicate-free)
CREATE TABLE source_roots (
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    path TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (project_id, path)
);

-- Indexed source files
CREATE TABLE files (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    path TEXT NOT NULL,
    lang TEXT NOT NULL,
    sha256 TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    mtime_unix INTEGER NOT NULL,
    indexed_at INTEGER NOT NULL,
    UNIQUE (project_id, path)
);

CREATE INDEX idx_files_project ON files(project_id);
CREATE INDEX idx_files_lang ON files(lang);

-- Symbol definitions. kind holds the stable integer code.
-- Lines are 1-based, columns 0-based, spans inclusive.
CREATE TABLE symbols (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    kind INTEGER NOT NULL,
    container_name TEXT NOT NULL DEFAULT '',
    signature TEXT,
    start_line INTEGER NOT NULL,
    start_col INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_col INTEGER NOT NULL
);

CREATE INDEX idx_symbols_name ON symbols(name);
CREATE INDEX idx_symbols_file ON symbols(file_id);
CREATE INDEX idx_symbols_file_pos ON symbols(file_id, start_line);

-- References (usages). kind holds the stable integer code.
CREATE TABLE refs (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    kind INTEGER NOT NULL,
    is_external INTEGER NOT NULL DEFAULT 0,
    is_builtin INTEGER NOT NULL DEFAULT 0,
    relation TEXT,
    receiver_type TEXT,
    target_type TEXT,
    context_container TEXT NOT NULL DEFAULT '',
    start_line INTEGER NOT NULL,
    start_col INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_col INTEGER NOT NULL
);

CREATE INDEX idx_refs_name ON refs(name);
CREATE INDEX idx_refs_file ON refs(file_id);
CREATE INDEX idx_refs_file_pos ON refs(file_id, start_line);
";

/// All migrations, ascending. Append here; never edit a shipped entry.
pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "base schema",
    sql: BASE_SCHEMA,
}];
