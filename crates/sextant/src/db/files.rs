//! File CRUD operations, including the transactional upsert.

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};

use super::{row_to_file_record, Index, FILES_COLUMNS};
use crate::error::Result;
use crate::parallel::ParsedFile;
use crate::types::{FileId, FileRecord, ProjectId};

impl Index {
    /// One-shot snapshot of `(path -> sha256)` for a project.
    ///
    /// This is what the reconciler diffs the filesystem against.
    pub fn all_files(&self, project: ProjectId) -> Result<HashMap<String, String>> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT path, sha256 FROM files WHERE project_id = ?1")?;
        let rows = stmt.query_map([project.as_i64()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = HashMap::new();
        for row in rows {
            let (path, sha) = row?;
            map.insert(path, sha);
        }
        Ok(map)
    }

    /// Get a file row by repo-relative path.
    pub fn get_file(&self, project: ProjectId, path: &str) -> Result<Option<FileRecord>> {
        let conn = self.connection()?;
        conn.query_row(
            &format!("SELECT {FILES_COLUMNS} FROM files WHERE project_id = ?1 AND path = ?2"),
            params![project.as_i64(), path],
            row_to_file_record,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Transactionally upsert a parsed file.
    ///
    /// Either inserts the file row or updates it in place, then deletes all
    /// prior symbols and refs for that file and inserts the new ones. No
    /// partial state is ever visible: a failure rolls the whole file back.
    ///
    /// Returns the file id plus `(symbols, refs)` written.
    pub fn upsert_file(
        &self,
        project: ProjectId,
        parsed: &ParsedFile,
    ) -> Result<(FileId, usize, usize)> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let indexed_at = Self::now_unix();

        let updated = tx.execute(
            "UPDATE files SET lang = ?3, sha256 = ?4, size_bytes = ?5, mtime_unix = ?6,
             indexed_at = ?7 WHERE project_id = ?1 AND path = ?2",
            params![
                project.as_i64(),
                parsed.rel_path,
                parsed.lang.as_str(),
                parsed.sha256,
                i64::try_from(parsed.size_bytes).unwrap_or(i64::MAX),
                parsed.mtime_unix,
                indexed_at
            ],
        )?;

        let file_id = if updated > 0 {
            let id: i64 = tx.query_row(
                "SELECT id FROM files WHERE project_id = ?1 AND path = ?2",
                params![project.as_i64(), parsed.rel_path],
                |row| row.get(0),
            )?;
            tx.execute("DELETE FROM symbols WHERE file_id = ?1", [id])?;
            tx.execute("DELETE FROM refs WHERE file_id = ?1", [id])?;
            id
        } else {
            tx.execute(
                "INSERT INTO files (project_id, path, lang, sha256, size_bytes, mtime_unix, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    project.as_i64(),
                    parsed.rel_path,
                    parsed.lang.as_str(),
                    parsed.sha256,
                    i64::try_from(parsed.size_bytes).unwrap_or(i64::MAX),
                    parsed.mtime_unix,
                    indexed_at
                ],
            )?;
            tx.last_insert_rowid()
        };

        for sym in &parsed.symbols {
            tx.execute(
                "INSERT INTO symbols (file_id, name, kind, container_name, signature,
                 start_line, start_col, end_line, end_col)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    file_id,
                    sym.name,
                    sym.kind.code(),
                    sym.container_name,
                    sym.signature,
                    sym.span.start_line,
                    sym.span.start_col,
                    sym.span.end_line,
                    sym.span.end_col
                ],
            )?;
        }

        for r in &parsed.refs {
            tx.execute(
                "INSERT INTO refs (file_id, name, kind, is_external, is_builtin, relation,
                 receiver_type, target_type, context_container,
                 start_line, start_col, end_line, end_col)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    file_id,
                    r.name,
                    r.kind.code(),
                    r.is_external,
                    r.is_builtin,
                    r.relation,
                    r.receiver_type,
                    r.target_type,
                    r.context_container,
                    r.span.start_line,
                    r.span.start_col,
                    r.span.end_line,
                    r.span.end_col
                ],
            )?;
        }

        tx.commit()?;
        Ok((
            FileId::from(file_id),
            parsed.symbols.len(),
            parsed.refs.len(),
        ))
    }

    /// Delete a file row; symbols and refs cascade.
    ///
    /// Returns whether a row existed.
    pub fn delete_file(&self, project: ProjectId, path: &str) -> Result<bool> {
        let conn = self.connection()?;
        let deleted = conn.execute(
            "DELETE FROM files WHERE project_id = ?1 AND path = ?2",
            params![project.as_i64(), path],
        )?;
        Ok(deleted > 0)
    }

    /// Delete every file of a project; used by the full-index wipe.
    pub fn delete_all_files(&self, project: ProjectId) -> Result<usize> {
        let conn = self.connection()?;
        let deleted = conn.execute(
            "DELETE FROM files WHERE project_id = ?1",
            [project.as_i64()],
        )?;
        Ok(deleted)
    }
}
