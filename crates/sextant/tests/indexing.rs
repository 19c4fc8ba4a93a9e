//! End-to-end indexing tests: full index, reconcile, single-file ops.

use std::path::Path;

use sextant::Sextant;
use tempfile::TempDir;

fn write_file(root: &Path, rel: &str, content: &str) {
    let abs = root.join(rel);
    std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
    std::fs::write(abs, content).unwrap();
}

fn fixture_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "pkg/a.go",
        "package pkg\n\n// Config holds state.\ntype Config struct {\n\tAddr string\n}\n\nfunc Load() Config {\n\tvar c Config\n\treturn c\n}\n",
    );
    write_file(
        dir.path(),
        "other/b.go",
        "package other\n\ntype Config struct {\n\tPort int\n}\n",
    );
    write_file(
        dir.path(),
        "web/app.ts",
        "export class Session {\n  id: string = '';\n}\n",
    );
    // Files the walker must ignore.
    write_file(dir.path(), "node_modules/dep/index.js", "var x = 1;\n");
    write_file(dir.path(), "README.md", "# fixture\n");
    dir
}

#[test]
fn full_index_counts_files_symbols_refs() {
    let repo = fixture_repo();
    let mut engine = Sextant::open(repo.path()).unwrap();

    let stats = engine.index().unwrap();

    assert_eq!(stats.indexed, 3, "go x2 + ts, no node_modules, no md");
    assert!(stats.symbols > 0);
    assert!(stats.refs > 0);
    assert!(stats.errors.is_empty());

    let store = engine.stats().unwrap();
    assert_eq!(store.file_count, 3);
}

#[test]
fn reconcile_over_unchanged_tree_skips_everything() {
    let repo = fixture_repo();
    let mut engine = Sextant::open(repo.path()).unwrap();
    engine.index().unwrap();

    let stats = engine.reconcile().unwrap();

    assert_eq!(stats.indexed, 0);
    assert_eq!(stats.deleted, 0);
    assert_eq!(stats.skipped, 3);
    assert!(stats.errors.is_empty());
}

#[test]
fn reconcile_reindexes_changed_files_only() {
    let repo = fixture_repo();
    let mut engine = Sextant::open(repo.path()).unwrap();
    engine.index().unwrap();

    write_file(
        repo.path(),
        "pkg/a.go",
        "package pkg\n\ntype Config struct {\n\tAddr string\n\tPort int\n}\n",
    );

    let stats = engine.reconcile().unwrap();
    assert_eq!(stats.indexed, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.deleted, 0);
}

#[test]
fn reconcile_drops_deleted_files() {
    let repo = fixture_repo();
    let mut engine = Sextant::open(repo.path()).unwrap();
    engine.index().unwrap();

    std::fs::remove_file(repo.path().join("other/b.go")).unwrap();

    let stats = engine.reconcile().unwrap();
    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.skipped, 2);

    // The deleted file's definitions are gone.
    let defs = engine
        .navigator()
        .definitions_by_name("Config", None, sextant::Language::Go)
        .unwrap();
    assert!(defs.iter().all(|d| d.path != "other/b.go"));
}

#[test]
fn single_file_roundtrip_skips_unchanged_hash() {
    let repo = fixture_repo();
    let mut engine = Sextant::open(repo.path()).unwrap();
    engine.index().unwrap();

    let abs = repo.path().join("pkg/a.go");

    // Unchanged content: no re-index.
    assert!(!engine.index_single_file(&abs).unwrap());

    write_file(repo.path(), "pkg/a.go", "package pkg\n\nfunc Only() {}\n");
    assert!(engine.index_single_file(&abs).unwrap());

    let defs = engine
        .navigator()
        .definitions_by_name("Only", None, sextant::Language::Go)
        .unwrap();
    assert_eq!(defs.len(), 1);

    // Old symbols from that file were replaced, not accumulated.
    let stale = engine
        .navigator()
        .definitions_by_name("Load", None, sextant::Language::Go)
        .unwrap();
    assert!(stale.is_empty());

    assert!(engine.remove_single_file(&abs).unwrap());
    assert!(!engine.remove_single_file(&abs).unwrap());
}

#[test]
fn unreadable_file_is_counted_but_does_not_abort() {
    let repo = fixture_repo();
    // Invalid UTF-8 in a source extension.
    std::fs::write(repo.path().join("pkg/broken.go"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();

    let mut engine = Sextant::open(repo.path()).unwrap();
    let stats = engine.index().unwrap();

    assert_eq!(stats.indexed, 3);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0]
        .path
        .to_string_lossy()
        .contains("broken.go"));
}

#[test]
fn failed_parse_preserves_prior_state_until_next_success() {
    let repo = fixture_repo();
    let mut engine = Sextant::open(repo.path()).unwrap();
    engine.index().unwrap();

    // Corrupt the file to invalid UTF-8: reconcile records an error but
    // keeps the previous rows for that path.
    std::fs::write(repo.path().join("pkg/a.go"), [0xff, 0xfe]).unwrap();
    let stats = engine.reconcile().unwrap();
    assert_eq!(stats.errors.len(), 1);

    let defs = engine
        .navigator()
        .definitions_by_name("Load", None, sextant::Language::Go)
        .unwrap();
    assert_eq!(defs.len(), 1, "prior index state must survive a bad parse");
}

#[test]
fn read_only_open_serves_queries_without_lock() {
    let repo = fixture_repo();
    {
        let mut engine = Sextant::open(repo.path()).unwrap();
        engine.index().unwrap();
    }

    let engine = Sextant::open_read_only(repo.path()).unwrap();
    let defs = engine
        .navigator()
        .definitions_by_name("Config", None, sextant::Language::Go)
        .unwrap();
    assert_eq!(defs.len(), 2);
}

#[test]
fn source_roots_limit_the_walk() {
    let repo = fixture_repo();

    let mut config = sextant::ProjectConfig::new(repo.path().to_path_buf());
    config.source_roots = vec!["pkg".to_string()];
    config.save(repo.path()).unwrap();

    let mut engine = Sextant::open(repo.path()).unwrap();
    let stats = engine.index().unwrap();

    assert_eq!(stats.indexed, 1);
    let info = engine.project_info();
    assert_eq!(info.source_roots, vec!["pkg"]);
}
