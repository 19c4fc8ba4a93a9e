//! Project and source-root operations.

use rusqlite::{params, OptionalExtension};

use super::Index;
use crate::error::Result;
use crate::types::ProjectId;

impl Index {
    /// Get or create the project row for a repository root. Idempotent.
    pub fn ensure_project(&self, repo_root: &str) -> Result<ProjectId> {
        let conn = self.connection()?;

        if let Some(id) = conn
            .query_row(
                "SELECT id FROM projects WHERE repo_root = ?1",
                [repo_root],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
        {
            return Ok(ProjectId::from(id));
        }

        conn.execute(
            "INSERT INTO projects (repo_root, created_at) VALUES (?1, ?2)",
            params![repo_root, Self::now_unix()],
        )?;
        Ok(ProjectId::from(conn.last_insert_rowid()))
    }

    /// Look up a project without creating it. Used by read-only opens.
    pub fn get_project(&self, repo_root: &str) -> Result<Option<ProjectId>> {
        let conn = self.connection()?;
        let id = conn
            .query_row(
                "SELECT id FROM projects WHERE repo_root = ?1",
                [repo_root],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(ProjectId::from))
    }

    /// Atomically replace the project's declared source roots, preserving
    /// the given order.
    pub fn ensure_source_roots(&self, project: ProjectId, roots: &[String]) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM source_roots WHERE project_id = ?1",
            [project.as_i64()],
        )?;
        for (position, root) in roots.iter().enumerate() {
            tx.execute(
                "INSERT INTO source_roots (project_id, path, position) VALUES (?1, ?2, ?3)",
                params![project.as_i64(), root, position as i64],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// The project's source roots in declaration order.
    pub fn source_roots(&self, project: ProjectId) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT path FROM source_roots WHERE project_id = ?1 ORDER BY position")?;
        let roots = stmt
            .query_map([project.as_i64()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(roots)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::tests::temp_db;

    use super::Index;

    #[test]
    fn ensure_project_is_idempotent() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();

        let a = index.ensure_project("/repo").unwrap();
        let b = index.ensure_project("/repo").unwrap();
        assert_eq!(a, b);

        let other = index.ensure_project("/elsewhere").unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn source_roots_replacement_is_atomic_and_ordered() {
        let (_dir, path) = temp_db();
        let index = Index::open(&path).unwrap();
        let project = index.ensure_project("/repo").unwrap();

        index
            .ensure_source_roots(project, &["src".to_string(), "tools".to_string()])
            .unwrap();
        assert_eq!(index.source_roots(project).unwrap(), vec!["src", "tools"]);

        index
            .ensure_source_roots(project, &["lib".to_string()])
            .unwrap();
        assert_eq!(index.source_roots(project).unwrap(), vec!["lib"]);
    }
}
