//! `SQLite` storage layer for the index.
//!
//! The database is the source of truth for all persistent data. It is
//! opened with write-ahead logging and foreign-key enforcement on, and
//! carries a versioned migration ledger.
//!
//! ## Module Structure
//!
//! - `schema` - DDL and the migration list
//! - `helpers` - Row conversion and shared SQL fragments
//! - `projects` - Project and source-root operations
//! - `files` - File CRUD and the transactional upsert
//! - `symbols` - Definition queries
//! - `references` - Usage queries
//!
//! ## Concurrency
//!
//! The connection is wrapped in a `Mutex`: navigator reads may run from
//! multiple threads, while bulk writes go through a single writer thread
//! that owns its own connection (see `store_writer`).

mod files;
mod helpers;
mod projects;
mod references;
mod schema;
mod symbols;

pub(crate) use helpers::{
    row_to_definition, row_to_file_record, row_to_usage, DEF_COLUMNS, FILES_COLUMNS,
    USAGE_COLUMNS,
};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Language;

/// Aggregate counts over the index contents.
#[derive(Debug, Default, Clone)]
pub struct StoreStats {
    /// Indexed file count
    pub file_count: usize,
    /// Files per language tag
    pub files_by_language: HashMap<Language, usize>,
    /// Symbol count
    pub symbol_count: usize,
    /// Reference count
    pub ref_count: usize,
}

/// `SQLite` database wrapper for the Sextant index.
pub struct Index {
    conn: Mutex<Connection>,
}

impl Index {
    /// Open or create the index database, applying pending migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure(&conn)?;

        let index = Self {
            conn: Mutex::new(conn),
        };
        index.migrate()?;
        Ok(index)
    }

    /// Open an existing database read-only.
    ///
    /// Used when another process holds the writer lock; queries still work
    /// against the last committed state.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    /// Acquire the connection lock.
    pub(crate) fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            Error::Internal(format!(
                "database connection mutex poisoned (a thread panicked while holding the lock): {e}"
            ))
        })
    }

    /// Current unix timestamp in seconds.
    pub(crate) fn now_unix() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }

    /// Apply pending migrations inside transactions, recording each in the
    /// ledger.
    ///
    /// A pre-ledger database (base tables present, ledger empty) gets
    /// version 1 backfilled without re-running its DDL.
    fn migrate(&self) -> Result<()> {
        let mut conn = self.connection()?;

        conn.execute_batch(schema::LEDGER)?;

        let current: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;

        // Legacy databases created before the ledger existed: the base
        // tables are already there, so record version 1 without its DDL.
        if current == 0 && Self::table_exists(&conn, "files")? {
            debug!("Backfilling migration ledger for pre-ledger database");
            conn.execute(
                "INSERT INTO schema_migrations (version, name, applied_at) VALUES (1, ?1, ?2)",
                rusqlite::params![schema::MIGRATIONS[0].name, Self::now_unix()],
            )?;
            return Self::apply_pending(&mut conn, 1);
        }

        Self::apply_pending(&mut conn, current)
    }

    fn apply_pending(conn: &mut Connection, current: i64) -> Result<()> {
        for migration in schema::MIGRATIONS {
            if migration.version <= current {
                continue;
            }
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql)?;
            tx.execute(
                "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![migration.version, migration.name, Self::now_unix()],
            )?;
            tx.commit()?;
            info!(
                version = migration.version,
                name = migration.name,
                "Applied schema migration"
            );
        }
        Ok(())
    }

    fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get aggregate statistics about the index contents.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.connection()?;
        let mut stats = StoreStats::default();

        let mut stmt = conn.prepare("SELECT lang, COUNT(*) FROM files GROUP BY lang")?;
        let rows = stmt.query_map([], |row| {
            let tag: String = row.get(0)?;
            let count: usize = row.get(1)?;
            Ok((tag, count))
        })?;
        for row in rows {
            let (tag, count) = row?;
            if let Some(lang) = Language::from_tag(&tag) {
                stats.files_by_language.insert(lang, count);
                stats.file_count += count;
            } else {
                tracing::warn!(lang = %tag, count, "Unknown language tag in database");
            }
        }

        stats.symbol_count =
            conn.query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))?;
        stats.ref_count = conn.query_row("SELECT COUNT(*) FROM refs", [], |row| row.get(0))?;

        Ok(stats)
    }

    /// Update `SQLite` query planner statistics after bulk changes.
    pub fn analyze(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch("ANALYZE")?;
        Ok(())
    }

    /// Vacuum the database.
    pub fn vacuum(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch("VACUUM")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub(crate) fn temp_db() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("should create temp directory");
        let path = dir.path().join("test.db");
        (dir, path)
    }

    #[test]
    fn open_creates_schema_and_ledger() {
        let (_dir, path) = temp_db();

        let index = Index::open(&path).expect("failed to open database");
        let conn = index.connection().unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for expected in ["projects", "source_roots", "files", "symbols", "refs"] {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(versions, vec![1]);
    }

    #[test]
    fn reopen_does_not_rerun_migrations() {
        let (_dir, path) = temp_db();

        drop(Index::open(&path).unwrap());
        let index = Index::open(&path).unwrap();

        let conn = index.connection().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_ledger_with_existing_tables_is_backfilled() {
        let (_dir, path) = temp_db();

        drop(Index::open(&path).unwrap());

        // Simulate a pre-ledger database by wiping the ledger rows.
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("DELETE FROM schema_migrations", []).unwrap();
        }

        let index = Index::open(&path).unwrap();
        let conn = index.connection().unwrap();
        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_migrations")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(versions, vec![1]);
    }

    #[test]
    fn read_only_open_serves_queries() {
        let (_dir, path) = temp_db();
        drop(Index::open(&path).unwrap());

        let ro = Index::open_read_only(&path).unwrap();
        let stats = ro.stats().unwrap();
        assert_eq!(stats.file_count, 0);
    }
}
