//! Usage (reference) queries for the navigator and graph builder.

use rusqlite::params;

use super::{row_to_usage, Index, USAGE_COLUMNS};
use crate::error::Result;
use crate::types::{Language, ProjectId, Usage};

impl Index {
    /// All usages matching `(name, lang)` for a project, ordered by file
    /// then position.
    pub fn usages_by_name(
        &self,
        project: ProjectId,
        name: &str,
        lang: Language,
    ) -> Result<Vec<Usage>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USAGE_COLUMNS} FROM refs r JOIN files f ON f.id = r.file_id
             WHERE f.project_id = ?1 AND r.name = ?2 AND f.lang = ?3
             ORDER BY f.path, r.start_line, r.start_col"
        ))?;
        let usages = stmt
            .query_map(params![project.as_i64(), name, lang.as_str()], row_to_usage)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(usages)
    }

    /// All refs inside an inclusive line range of one file, ordered by
    /// start line then column.
    pub fn refs_in_file_range(
        &self,
        project: ProjectId,
        path: &str,
        start_line: u32,
        end_line: u32,
        lang: Language,
    ) -> Result<Vec<Usage>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USAGE_COLUMNS} FROM refs r JOIN files f ON f.id = r.file_id
             WHERE f.project_id = ?1 AND f.path = ?2 AND f.lang = ?3
               AND r.start_line >= ?4 AND r.start_line <= ?5
             ORDER BY r.start_line, r.start_col"
        ))?;
        let usages = stmt
            .query_map(
                params![project.as_i64(), path, lang.as_str(), start_line, end_line],
                row_to_usage,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(usages)
    }

    /// The ref whose identifier covers the given 1-based line and 0-based
    /// column, if any.
    pub fn ref_at(
        &self,
        project: ProjectId,
        path: &str,
        line: u32,
        col: u32,
    ) -> Result<Option<Usage>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USAGE_COLUMNS} FROM refs r JOIN files f ON f.id = r.file_id
             WHERE f.project_id = ?1 AND f.path = ?2 AND r.start_line = ?3
               AND r.start_col <= ?4 AND ?4 <= r.end_col
             ORDER BY r.start_col DESC LIMIT 1"
        ))?;
        let mut rows = stmt.query_map(params![project.as_i64(), path, line, col], row_to_usage)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::db::files::tests::parsed_fixture;
    use crate::db::tests::temp_db;
    use crate::parallel::ExtractedRef;
    use crate::types::{Language, RefKind, Span};

    use super::Index;

    fn usage_ref(name: &str, kind: RefKind, line: u32, col: u32) -> ExtractedRef {
        ExtractedRef {
            name: name.to_string(),
            kind,
            relation: None,
            receiver_type: None,
            target_type: None,
            is_external: false,
            is_builtin: false,
            context_container: String::new(),
            span: Span::for_identifier(line, col, name),
        }
    }

    #[test]
    fn usages_by_name_orders_by_position() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        let mut parsed = parsed_fixture("a.go", "sha");
        parsed.symbols.clear();
        parsed.refs = vec![
            usage_ref("Config", RefKind::Call, 20, 4),
            usage_ref("Config", RefKind::Read, 5, 2),
            usage_ref("Other", RefKind::Read, 1, 0),
        ];
        index.upsert_file(project, &parsed).unwrap();

        let usages = index
            .usages_by_name(project, "Config", Language::Go)
            .unwrap();
        assert_eq!(usages.len(), 2);
        assert_eq!(usages[0].span.start_line, 5);
        assert_eq!(usages[1].span.start_line, 20);
    }

    #[test]
    fn refs_in_range_is_inclusive_on_both_ends() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        let mut parsed = parsed_fixture("a.go", "sha");
        parsed.symbols.clear();
        parsed.refs = vec![
            usage_ref("a", RefKind::Read, 4, 0),
            usage_ref("b", RefKind::Read, 5, 0),
            usage_ref("c", RefKind::Read, 10, 0),
            usage_ref("d", RefKind::Read, 11, 0),
        ];
        index.upsert_file(project, &parsed).unwrap();

        let usages = index
            .refs_in_file_range(project, "a.go", 5, 10, Language::Go)
            .unwrap();
        let names: Vec<&str> = usages.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn ref_at_resolves_identifier_under_cursor() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        let mut parsed = parsed_fixture("a.go", "sha");
        parsed.symbols.clear();
        parsed.refs = vec![usage_ref("Println", RefKind::Call, 7, 6)];
        index.upsert_file(project, &parsed).unwrap();

        let hit = index.ref_at(project, "a.go", 7, 9).unwrap();
        assert_eq!(hit.unwrap().name, "Println");
        assert!(index.ref_at(project, "a.go", 7, 20).unwrap().is_none());
    }
}
