//! Definition queries for the navigator.

use rusqlite::params;

use super::{row_to_definition, Index, DEF_COLUMNS};
use crate::error::Result;
use crate::types::{Definition, Language, ProjectId};

impl Index {
    /// All definitions matching `(name, lang)` for a project.
    ///
    /// Rows come back ordered by kind code then position; the navigator
    /// applies the bias-file ordering on top.
    pub fn definitions_by_name(
        &self,
        project: ProjectId,
        name: &str,
        lang: Language,
    ) -> Result<Vec<Definition>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DEF_COLUMNS} FROM symbols s JOIN files f ON f.id = s.file_id
             WHERE f.project_id = ?1 AND s.name = ?2 AND f.lang = ?3
             ORDER BY s.kind, f.path, s.start_line"
        ))?;
        let defs = stmt
            .query_map(
                params![project.as_i64(), name, lang.as_str()],
                row_to_definition,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(defs)
    }

    /// All definitions in one file, ordered by position.
    pub fn definitions_in_file(&self, project: ProjectId, path: &str) -> Result<Vec<Definition>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DEF_COLUMNS} FROM symbols s JOIN files f ON f.id = s.file_id
             WHERE f.project_id = ?1 AND f.path = ?2
             ORDER BY s.start_line, s.start_col"
        ))?;
        let defs = stmt
            .query_map(params![project.as_i64(), path], row_to_definition)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(defs)
    }

    /// The symbol whose identifier covers the given 1-based line and
    /// 0-based column, if any.
    ///
    /// A hit requires `start_line == line` and `start_col <= col <=
    /// start_col + byte_len(name)`. The stored `end_col` is the enclosing
    /// declaration's end, not the identifier's, so the identifier bound is
    /// recomputed here; the byte length is computed in Rust because every
    /// column in the engine is a byte offset while SQL `length()` counts
    /// characters.
    pub fn symbol_at(
        &self,
        project: ProjectId,
        path: &str,
        line: u32,
        col: u32,
    ) -> Result<Option<Definition>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DEF_COLUMNS} FROM symbols s JOIN files f ON f.id = s.file_id
             WHERE f.project_id = ?1 AND f.path = ?2 AND s.start_line = ?3
               AND s.start_col <= ?4
             ORDER BY s.start_col DESC"
        ))?;
        let rows = stmt.query_map(
            params![project.as_i64(), path, line, col],
            row_to_definition,
        )?;

        #[allow(clippy::cast_possible_truncation)]
        for row in rows {
            let def = row?;
            if col <= def.span.start_col + def.name.len() as u32 {
                return Ok(Some(def));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::files::tests::parsed_fixture;
    use crate::db::tests::temp_db;
    use crate::parallel::{ExtractedSymbol, ParsedFile};
    use crate::types::{Language, Span, SymbolKind};

    use super::Index;

    fn file_with_symbols(path: &str, symbols: Vec<ExtractedSymbol>) -> ParsedFile {
        let mut parsed = parsed_fixture(path, "sha");
        parsed.symbols = symbols;
        parsed.refs.clear();
        parsed
    }

    fn symbol(name: &str, kind: SymbolKind, line: u32, col: u32) -> ExtractedSymbol {
        ExtractedSymbol {
            name: name.to_string(),
            kind,
            container_name: String::new(),
            signature: None,
            span: Span::for_identifier(line, col, name),
        }
    }

    #[test]
    fn definitions_by_name_filters_on_language() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        index
            .upsert_file(
                project,
                &file_with_symbols("a.go", vec![symbol("Config", SymbolKind::Struct, 3, 5)]),
            )
            .unwrap();

        let hits = index
            .definitions_by_name(project, "Config", Language::Go)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "a.go");

        let misses = index
            .definitions_by_name(project, "Config", Language::Rust)
            .unwrap();
        assert!(misses.is_empty());
    }

    #[test]
    fn definitions_order_by_kind_code() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        index
            .upsert_file(
                project,
                &file_with_symbols(
                    "a.go",
                    vec![
                        symbol("Thing", SymbolKind::Variable, 10, 0),
                        symbol("Thing", SymbolKind::Struct, 3, 5),
                    ],
                ),
            )
            .unwrap();

        let hits = index
            .definitions_by_name(project, "Thing", Language::Go)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].kind, SymbolKind::Struct);
        assert_eq!(hits[1].kind, SymbolKind::Variable);
    }

    #[test]
    fn symbol_at_respects_column_bounds() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        index
            .upsert_file(
                project,
                &file_with_symbols("a.go", vec![symbol("Foo", SymbolKind::Struct, 3, 5)]),
            )
            .unwrap();

        assert!(index.symbol_at(project, "a.go", 3, 5).unwrap().is_some());
        assert!(index.symbol_at(project, "a.go", 3, 8).unwrap().is_some());
        assert!(index.symbol_at(project, "a.go", 3, 9).unwrap().is_none());
        assert!(index.symbol_at(project, "a.go", 4, 5).unwrap().is_none());
    }

    #[test]
    fn symbol_at_uses_byte_length_for_multibyte_names() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        // "Größe" is 5 characters but 7 bytes; columns are byte offsets.
        index
            .upsert_file(
                project,
                &file_with_symbols("a.go", vec![symbol("Größe", SymbolKind::Struct, 3, 5)]),
            )
            .unwrap();

        assert!(index.symbol_at(project, "a.go", 3, 11).unwrap().is_some());
        assert!(index.symbol_at(project, "a.go", 3, 12).unwrap().is_some());
        assert!(index.symbol_at(project, "a.go", 3, 13).unwrap().is_none());
    }
}
