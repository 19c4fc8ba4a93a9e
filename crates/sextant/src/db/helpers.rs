//! Row conversion and shared SQL fragments for the store.

use rusqlite::Row;

use crate::types::{Definition, FileId, FileRecord, Language, RefKind, Span, SymbolKind, Usage};

/// Columns for `files` queries, in `row_to_file_record` order.
pub(crate) const FILES_COLUMNS: &str =
    "id, path, lang, sha256, size_bytes, mtime_unix, indexed_at";

/// Columns for definition queries (symbols joined with files), in
/// `row_to_definition` order. Aliases: `s` = symbols, `f` = files.
pub(crate) const DEF_COLUMNS: &str = "s.id, f.path, f.lang, s.name, s.kind, s.container_name, \
     s.signature, s.start_line, s.start_col, s.end_line, s.end_col";

/// Columns for usage queries (refs joined with files), in `row_to_usage`
/// order. Aliases: `r` = refs, `f` = files.
pub(crate) const USAGE_COLUMNS: &str = "r.id, f.path, f.lang, r.name, r.kind, r.is_external, \
     r.is_builtin, r.relation, r.receiver_type, r.target_type, r.context_container, \
     r.start_line, r.start_col, r.end_line, r.end_col";

/// Parse a persisted language tag.
///
/// Unknown tags fail the row conversion; they indicate a database written
/// by a newer engine.
pub(crate) fn parse_language(tag: &str) -> rusqlite::Result<Language> {
    Language::from_tag(tag).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown language tag: {tag}").into(),
        )
    })
}

fn span_from_row(row: &Row, base: usize) -> rusqlite::Result<Span> {
    Ok(Span {
        start_line: row.get(base)?,
        start_col: row.get(base + 1)?,
        end_line: row.get(base + 2)?,
        end_col: row.get(base + 3)?,
    })
}

/// Convert a `FILES_COLUMNS` row into a [`FileRecord`].
pub(crate) fn row_to_file_record(row: &Row) -> rusqlite::Result<FileRecord> {
    let lang: String = row.get(2)?;
    Ok(FileRecord {
        id: FileId::from(row.get::<_, i64>(0)?),
        path: row.get(1)?,
        lang: parse_language(&lang)?,
        sha256: row.get(3)?,
        size_bytes: row.get::<_, i64>(4)?.unsigned_abs(),
        mtime_unix: row.get(5)?,
        indexed_at: row.get(6)?,
    })
}

/// Convert a `DEF_COLUMNS` row into a [`Definition`].
pub(crate) fn row_to_definition(row: &Row) -> rusqlite::Result<Definition> {
    let lang: String = row.get(2)?;
    Ok(Definition {
        id: row.get(0)?,
        path: row.get(1)?,
        lang: parse_language(&lang)?,
        name: row.get(3)?,
        kind: SymbolKind::from_code(row.get(4)?),
        container_name: row.get(5)?,
        signature: row.get(6)?,
        span: span_from_row(row, 7)?,
    })
}

/// Convert a `USAGE_COLUMNS` row into a [`Usage`].
pub(crate) fn row_to_usage(row: &Row) -> rusqlite::Result<Usage> {
    let lang: String = row.get(2)?;
    Ok(Usage {
        id: row.get(0)?,
        path: row.get(1)?,
        lang: parse_language(&lang)?,
        name: row.get(3)?,
        kind: RefKind::from_code(row.get(4)?),
        is_external: row.get(5)?,
        is_builtin: row.get(6)?,
        relation: row.get(7)?,
        receiver_type: row.get(8)?,
        target_type: row.get(9)?,
        context_container: row.get(10)?,
        span: span_from_row(row, 11)?,
    })
}
