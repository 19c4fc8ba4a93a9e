//! # Sextant: local code-intelligence engine
//!
//! Sextant builds and maintains a persistent index of symbol definitions
//! and references for a single repository, answers go-to-definition and
//! find-usages queries, and computes probabilistic dependency scores that
//! rank candidate definition-usage pairings into symbol- and file-level
//! dependency graphs.
//!
//! ## Design Philosophy
//!
//! - **Index, not analyzer** - resolution is lexical-plus-heuristic; identity
//!   is by name string, disambiguated by probabilistic scoring
//! - **One repository, one index** - a single `SQLite` database under
//!   `.sextant/` at the repository root
//! - **Single writer** - parallel parsing, serialized storage; one live
//!   writer process per repository
//! - **Embeddable** - library first, CLI second; an RPC transport is a
//!   collaborator, not a dependency
//!
//! ## Quick Start
//!
//! ```no_run
//! use sextant::Sextant;
//! use std::path::Path;
//!
//! let mut engine = Sextant::open(Path::new("/path/to/repo"))?;
//!
//! // Build the index
//! let stats = engine.index()?;
//! println!("indexed {} files, {} symbols", stats.indexed, stats.symbols);
//!
//! // Navigate
//! let defs = engine
//!     .navigator()
//!     .definitions_by_name("Config", None, sextant::Language::Go)?;
//! # Ok::<(), sextant::Error>(())
//! ```

pub mod config;
pub mod graph;
pub mod logging;

mod db;
mod error;
mod languages;
mod lock;
mod navigate;
mod parallel;
mod score;
mod snippets;
mod store_writer;
mod types;
mod watcher;

pub use config::ProjectConfig;
pub use db::StoreStats;
pub use error::{Error, IndexError, IndexErrorKind, Result};
pub use navigate::Navigator;
pub use score::{group_adjacent, score_usages, ScoreOptions, UsageGroup};
pub use snippets::{fetch_definitions_code, fetch_usages_code, safe_join_path, SourceCache};
pub use types::{
    Definition, FileId, FileRecord, IndexStats, Language, ProjectId, ProjectInfo, RefKind,
    ScoredUsage, Span, SymbolKind, Usage,
};
pub use watcher::DEBOUNCE_MS;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Instant, UNIX_EPOCH};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use db::Index;
use lock::WriterLock;
use parallel::{ParsedFile, WorkItem};
use store_writer::StoreWriter;

/// Directory names never descended into by the walker: version-control
/// metadata, dependency caches, build outputs. Hidden directories are
/// pruned separately.
const EXCLUDED_DIRS: &[&str] = &[
    "__pycache__",
    "bin",
    "build",
    "dist",
    "node_modules",
    "obj",
    "out",
    "target",
    "vendor",
    "venv",
];

/// Name of the index database inside the state directory.
pub const DB_FILE: &str = "index.db";

/// Code intelligence engine for one repository.
///
/// `Sextant` owns the index database and the writer lock. Opening is
/// writable by default; [`Sextant::open_read_only`] degrades gracefully
/// when another process holds the lock.
pub struct Sextant {
    repo_root: PathBuf,
    db_path: PathBuf,
    config: ProjectConfig,
    db: Index,
    project: ProjectId,
    _writer_lock: Option<WriterLock>,
}

impl Sextant {
    /// Open the engine for a repository, acquiring the writer lock.
    ///
    /// Creates the state directory, configuration document, and database
    /// on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] when another live process owns the index,
    /// and [`Error::Config`] for an invalid configuration document.
    pub fn open(repo_root: &Path) -> Result<Self> {
        let repo_root = canonical_root(repo_root)?;
        let config = ProjectConfig::load(&repo_root)?;
        let state_dir = ProjectConfig::state_dir(&repo_root);

        let writer_lock = WriterLock::acquire(&state_dir)?;

        if !state_dir.join(config::CONFIG_FILE).exists() {
            config.save(&repo_root)?;
        }

        let db_path = state_dir.join(DB_FILE);
        let db = Index::open(&db_path)?;

        let project = db.ensure_project(&repo_root.to_string_lossy())?;
        db.ensure_source_roots(project, &config.source_roots)?;

        Ok(Self {
            repo_root,
            db_path,
            config,
            db,
            project,
            _writer_lock: Some(writer_lock),
        })
    }

    /// Open the engine read-only, without taking the writer lock.
    ///
    /// Queries serve the last committed state. Fails when the database has
    /// never been created.
    pub fn open_read_only(repo_root: &Path) -> Result<Self> {
        let repo_root = canonical_root(repo_root)?;
        let config = ProjectConfig::load(&repo_root)?;
        let db_path = ProjectConfig::state_dir(&repo_root).join(DB_FILE);

        if !db_path.exists() {
            return Err(Error::Config(format!(
                "no index at {}; run a full index first",
                db_path.display()
            )));
        }

        let db = Index::open_read_only(&db_path)?;
        let project = db
            .get_project(&repo_root.to_string_lossy())?
            .ok_or_else(|| Error::Config("index has no project for this repository".to_string()))?;

        Ok(Self {
            repo_root,
            db_path,
            config,
            db,
            project,
            _writer_lock: None,
        })
    }

    /// Static facts about the open project.
    #[must_use]
    pub fn project_info(&self) -> ProjectInfo {
        ProjectInfo {
            repo_root: self.repo_root.clone(),
            source_roots: self.config.source_roots.clone(),
            db_path: self.db_path.clone(),
        }
    }

    /// The repository root this engine serves.
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Read-only navigator over the index.
    #[must_use]
    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::new(&self.db, self.project, &self.repo_root)
    }

    /// Aggregate statistics over the index contents.
    pub fn stats(&self) -> Result<StoreStats> {
        self.db.stats()
    }

    /// Update query-planner statistics and compact the database.
    pub fn optimize(&self) -> Result<()> {
        self.db.analyze()?;
        self.db.vacuum()
    }

    // === Query operations ===

    /// Usages of a name with dependency scores attached, in adjacency-group
    /// order (descending group score, ascending line within a group).
    pub fn usages_with_scores(
        &self,
        name: &str,
        bias_file: Option<&str>,
        lang: Language,
    ) -> Result<Vec<ScoredUsage>> {
        let nav = self.navigator();
        let usages = nav.usages_by_name(name, lang)?;
        let candidates = nav.definitions_by_name(name, bias_file, lang)?;

        let mut cache = SourceCache::new(&self.repo_root);
        let scores = score::score_usages(&mut cache, &usages, &candidates, None);
        let groups = score::group_adjacent(&usages, &scores, ScoreOptions::default().group_gap);

        let mut out = Vec::with_capacity(usages.len());
        for group in groups {
            for idx in group.usages {
                out.push(ScoredUsage {
                    usage: usages[idx].clone(),
                    score: scores[idx].score,
                    best_definition: scores[idx].best.map(|b| candidates[b].node_id()),
                });
            }
        }
        Ok(out)
    }

    /// Build the dependency graph for the best definition of `name`.
    pub fn dependency_graph(
        &self,
        name: &str,
        bias_file: Option<&str>,
        lang: Language,
        options: &graph::GraphOptions,
    ) -> Result<graph::DependencyGraph> {
        let nav = self.navigator();
        let candidates = nav.definitions_by_name(name, bias_file, lang)?;
        let primary = candidates
            .first()
            .cloned()
            .ok_or_else(|| Error::BadRequest(format!("no definitions for '{name}'")))?;

        let mut cache = SourceCache::new(&self.repo_root);
        graph::build(&nav, &mut cache, &primary, &candidates, options)
    }

    /// Build the dependency graph for the identifier at a position.
    pub fn dependency_graph_at(
        &self,
        path: &str,
        line: u32,
        col: u32,
        options: &graph::GraphOptions,
    ) -> Result<graph::DependencyGraph> {
        let nav = self.navigator();
        let rel = nav.normalize_path(path);
        let (name, lang) = nav.identifier_at(&rel, line, col)?;
        self.dependency_graph(&name, Some(&rel), lang, options)
    }

    /// Fetch doc-expanded code blocks for definitions.
    #[must_use]
    pub fn fetch_definitions(&self, defs: &[Definition]) -> String {
        let mut cache = SourceCache::new(&self.repo_root);
        snippets::fetch_definitions_code(&mut cache, defs)
    }

    /// Fetch merged context windows around usages.
    #[must_use]
    pub fn fetch_usages(&self, usages: &[Usage], lines_around: u32) -> String {
        let mut cache = SourceCache::new(&self.repo_root);
        snippets::fetch_usages_code(&mut cache, usages, lines_around)
    }

    // === Indexing ===

    /// Full index from a wiped state: delete all files for the project,
    /// discover work items, parse in parallel, store through the single
    /// writer.
    pub fn index(&mut self) -> Result<IndexStats> {
        let cancel = AtomicBool::new(false);
        self.index_with_cancel(&cancel)
    }

    /// Full index with a cooperative cancellation flag: once set, no new
    /// work items are accepted; in-flight work completes naturally.
    pub fn index_with_cancel(&mut self, cancel: &AtomicBool) -> Result<IndexStats> {
        let start = Instant::now();
        let mut stats = IndexStats::default();

        let wiped = self.db.delete_all_files(self.project)?;
        if wiped > 0 {
            debug!(wiped, "Cleared previous index state");
        }
        self.db.ensure_source_roots(self.project, &self.config.source_roots)?;

        let items = self.discover_files(&mut stats)?;
        let total = items.len();
        info!(total, "Starting parallel parse");

        let workers = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .unwrap_or(1)
            .max(1)
            .min(total.max(1));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::Internal(format!("building parser pool: {e}")))?;

        let writer = StoreWriter::spawn(self.db_path.clone(), self.project);
        let parse_errors: Mutex<Vec<IndexError>> = Mutex::new(Vec::new());

        pool.install(|| {
            items.par_iter().for_each(|item| {
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                match parse_work_item(item) {
                    Ok(parsed) => writer.send(parsed),
                    Err(e) => {
                        let err = IndexError::from_error(item.abs_path.clone(), &e);
                        match parse_errors.lock() {
                            Ok(mut guard) => guard.push(err),
                            Err(poisoned) => poisoned.into_inner().push(err),
                        }
                    }
                }
            });
        });

        let write_result = writer.finish()?;
        stats.indexed = write_result.files_written;
        stats.symbols = write_result.symbols_written;
        stats.refs = write_result.refs_written;
        stats.errors.extend(write_result.errors);

        match parse_errors.into_inner() {
            Ok(errors) => stats.errors.extend(errors),
            Err(poisoned) => stats.errors.extend(poisoned.into_inner()),
        }

        self.db.analyze()?;

        stats.duration = start.elapsed();
        info!(
            indexed = stats.indexed,
            symbols = stats.symbols,
            refs = stats.refs,
            errors = stats.errors.len(),
            "Full index complete"
        );
        Ok(stats)
    }

    /// Incremental reconcile: hash every discovered file, re-extract only
    /// the changed ones, and drop stored files that no longer exist.
    pub fn reconcile(&mut self) -> Result<IndexStats> {
        let start = Instant::now();
        let mut stats = IndexStats::default();

        let stored = self.db.all_files(self.project)?;
        let items = self.discover_files(&mut stats)?;

        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

        for item in items {
            seen.insert(item.rel_path.clone());

            match parse_metadata(&item.abs_path) {
                Ok((bytes, sha256, size_bytes, mtime_unix)) => {
                    if stored.get(&item.rel_path).is_some_and(|prev| *prev == sha256) {
                        stats.skipped += 1;
                        continue;
                    }
                    match extract_parsed(&item, bytes, sha256, size_bytes, mtime_unix) {
                        Ok(parsed) => match self.db.upsert_file(self.project, &parsed) {
                            Ok((_, symbols, refs)) => {
                                stats.indexed += 1;
                                stats.symbols += symbols;
                                stats.refs += refs;
                            }
                            Err(e) => stats
                                .errors
                                .push(IndexError::from_error(item.abs_path.clone(), &e)),
                        },
                        Err(e) => stats
                            .errors
                            .push(IndexError::from_error(item.abs_path.clone(), &e)),
                    }
                }
                Err(e) => stats
                    .errors
                    .push(IndexError::from_error(item.abs_path.clone(), &e)),
            }
        }

        // Anything stored but not seen on disk is gone.
        for path in stored.keys() {
            if !seen.contains(path) {
                if self.db.delete_file(self.project, path)? {
                    stats.deleted += 1;
                }
            }
        }

        stats.duration = start.elapsed();
        info!(
            indexed = stats.indexed,
            skipped = stats.skipped,
            deleted = stats.deleted,
            errors = stats.errors.len(),
            "Reconcile complete"
        );
        Ok(stats)
    }

    /// Re-index one file, driven by the watcher.
    ///
    /// Returns `false` without touching the store when the content hash is
    /// unchanged or the language is unknown.
    pub fn index_single_file(&mut self, abs_path: &Path) -> Result<bool> {
        let Some(rel_path) = self.relative_path(abs_path) else {
            return Ok(false);
        };
        let Some(lang) = Language::from_path(abs_path) else {
            return Ok(false);
        };

        let item = WorkItem {
            abs_path: abs_path.to_path_buf(),
            rel_path,
            lang,
        };

        let (bytes, sha256, size_bytes, mtime_unix) = parse_metadata(&item.abs_path)?;
        if self
            .db
            .get_file(self.project, &item.rel_path)?
            .is_some_and(|record| record.sha256 == sha256)
        {
            return Ok(false);
        }

        let parsed = extract_parsed(&item, bytes, sha256, size_bytes, mtime_unix)?;
        self.db.upsert_file(self.project, &parsed)?;
        debug!(file = %item.rel_path, "Re-indexed single file");
        Ok(true)
    }

    /// Remove one file from the index, driven by the watcher.
    pub fn remove_single_file(&mut self, abs_path: &Path) -> Result<bool> {
        let Some(rel_path) = self.relative_path(abs_path) else {
            return Ok(false);
        };
        let removed = self.db.delete_file(self.project, &rel_path)?;
        if removed {
            debug!(file = %rel_path, "Removed file from index");
        }
        Ok(removed)
    }

    /// Watch the source roots and keep the index reconciled until `stop`
    /// is set. Blocks the calling thread.
    pub fn watch(&mut self, stop: &AtomicBool) -> Result<()> {
        watcher::watch(self, stop)
    }

    /// Absolute paths of the configured source roots.
    pub(crate) fn watch_roots(&self) -> Vec<PathBuf> {
        self.config
            .source_roots
            .iter()
            .map(|root| {
                if root == "." {
                    self.repo_root.clone()
                } else {
                    self.repo_root.join(root)
                }
            })
            .collect()
    }

    /// Repo-relative form of an absolute path, with forward slashes.
    /// Returns `None` for paths outside the repository.
    pub(crate) fn relative_path(&self, abs_path: &Path) -> Option<String> {
        let rel = abs_path.strip_prefix(&self.repo_root).ok()?;
        Some(rel.to_string_lossy().replace('\\', "/"))
    }

    /// Whether a path component is skipped by the walker.
    pub(crate) fn is_excluded_dir(name: &str) -> bool {
        name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
    }

    /// Walk the source roots and collect work items for known languages.
    fn discover_files(&self, stats: &mut IndexStats) -> Result<Vec<WorkItem>> {
        let mut items = Vec::new();

        for root in self.watch_roots() {
            if !root.exists() {
                warn!(root = %root.display(), "Source root missing, skipping");
                continue;
            }
            self.walk_dir(&root, &mut items, stats);
        }

        // Deterministic order keeps run output stable.
        items.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(items)
    }

    fn walk_dir(&self, dir: &Path, items: &mut Vec<WorkItem>, stats: &mut IndexStats) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                stats.errors.push(IndexError::io_error(dir.to_path_buf(), &e));
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if path.is_dir() {
                if !Self::is_excluded_dir(&name) {
                    self.walk_dir(&path, items, stats);
                }
                continue;
            }
            if name.starts_with('.') {
                continue;
            }

            let Some(lang) = Language::from_path(&path) else {
                continue;
            };
            let Some(rel_path) = self.relative_path(&path) else {
                continue;
            };

            items.push(WorkItem {
                abs_path: path,
                rel_path,
                lang,
            });
        }
    }
}

/// Canonicalize the repository root, with a readable error for bad paths.
fn canonical_root(repo_root: &Path) -> Result<PathBuf> {
    repo_root.canonicalize().map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("repository root not found: {}", repo_root.display()),
        ))
    })
}

/// Read one file and compute the facts the reconciler compares:
/// `(bytes, sha256, size, mtime)`.
fn parse_metadata(abs_path: &Path) -> Result<(Vec<u8>, String, u64, i64)> {
    let bytes = std::fs::read(abs_path)?;
    let sha256 = hex_digest(&bytes);
    let metadata = std::fs::metadata(abs_path)?;
    let size_bytes = metadata.len();
    let mtime_unix = metadata
        .modified()
        .ok()
        .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
    Ok((bytes, sha256, size_bytes, mtime_unix))
}

/// Run the extractor over already-read bytes.
fn extract_parsed(
    item: &WorkItem,
    bytes: Vec<u8>,
    sha256: String,
    size_bytes: u64,
    mtime_unix: i64,
) -> Result<ParsedFile> {
    let source = std::str::from_utf8(&bytes)
        .map_err(|_| Error::Parse("file is not valid UTF-8".to_string()))?;

    let (symbols, refs) = languages::extract::extract_source(item.lang, source)?;

    Ok(ParsedFile {
        rel_path: item.rel_path.clone(),
        lang: item.lang,
        sha256,
        size_bytes,
        mtime_unix,
        symbols,
        refs,
    })
}

/// Parse one work item end to end (worker-side: read, hash, extract).
fn parse_work_item(item: &WorkItem) -> Result<ParsedFile> {
    let (bytes, sha256, size_bytes, mtime_unix) = parse_metadata(&item.abs_path)?;
    extract_parsed(item, bytes, sha256, size_bytes, mtime_unix)
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_dirs_cover_caches_and_hidden() {
        assert!(Sextant::is_excluded_dir(".git"));
        assert!(Sextant::is_excluded_dir("node_modules"));
        assert!(Sextant::is_excluded_dir("target"));
        assert!(Sextant::is_excluded_dir("__pycache__"));
        assert!(!Sextant::is_excluded_dir("src"));
        assert!(!Sextant::is_excluded_dir("pkg"));
    }

    #[test]
    fn hex_digest_is_sha256() {
        // sha256("abc")
        assert_eq!(
            hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
