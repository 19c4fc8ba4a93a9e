//! Read-only navigation queries: definitions, usages, identifier-at-cursor.
//!
//! All positions at this boundary are 1-based lines and 0-based columns.
//! Paths accepted from clients may be absolute; they are normalized to
//! repo-relative form before querying.

use std::path::Path;

use crate::db::Index;
use crate::error::{Error, Result};
use crate::types::{Definition, Language, ProjectId, Usage};

/// Read-only query surface over the index.
///
/// Borrowed from the engine; queries may run concurrently with each other
/// and are serialized against writes at the storage layer.
pub struct Navigator<'a> {
    db: &'a Index,
    project: ProjectId,
    repo_root: &'a Path,
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(db: &'a Index, project: ProjectId, repo_root: &'a Path) -> Self {
        Self {
            db,
            project,
            repo_root,
        }
    }

    /// All definitions matching `(name, lang)`, bias-file rows first, then
    /// ascending symbol kind code.
    pub fn definitions_by_name(
        &self,
        name: &str,
        bias_file: Option<&str>,
        lang: Language,
    ) -> Result<Vec<Definition>> {
        let mut defs = self.db.definitions_by_name(self.project, name, lang)?;

        if let Some(bias) = bias_file.map(|b| self.normalize_path(b)) {
            defs.sort_by_key(|d| (d.path != bias, d.kind.code()));
        }

        Ok(defs)
    }

    /// Resolve the identifier at a position, then list its definitions
    /// with the position's file as the bias file.
    pub fn definitions_by_position(
        &self,
        path: &str,
        line: u32,
        col: u32,
    ) -> Result<Vec<Definition>> {
        let rel = self.normalize_path(path);
        let (name, lang) = self.identifier_at(&rel, line, col)?;
        self.definitions_by_name(&name, Some(&rel), lang)
    }

    /// All usages matching `(name, lang)`.
    pub fn usages_by_name(&self, name: &str, lang: Language) -> Result<Vec<Usage>> {
        self.db.usages_by_name(self.project, name, lang)
    }

    /// Resolve the identifier at a position, then list its usages.
    pub fn usages_by_position(&self, path: &str, line: u32, col: u32) -> Result<Vec<Usage>> {
        let rel = self.normalize_path(path);
        let (name, lang) = self.identifier_at(&rel, line, col)?;
        self.usages_by_name(&name, lang)
    }

    /// All refs within an inclusive line range of one file, ordered by
    /// start line then column.
    pub fn refs_in_file_range(
        &self,
        path: &str,
        start_line: u32,
        end_line: u32,
        lang: Language,
    ) -> Result<Vec<Usage>> {
        let rel = self.normalize_path(path);
        if end_line < start_line {
            return Err(Error::BadRequest(format!(
                "invalid range: {start_line}..{end_line}"
            )));
        }
        self.db
            .refs_in_file_range(self.project, &rel, start_line, end_line, lang)
    }

    /// The identifier covering a 1-based line / 0-based column, and the
    /// file's language. Symbols are consulted before refs.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`] when the file is not indexed or no identifier
    /// covers the position.
    pub fn identifier_at(&self, path: &str, line: u32, col: u32) -> Result<(String, Language)> {
        let rel = self.normalize_path(path);

        let record = self.db.get_file(self.project, &rel)?.ok_or_else(|| {
            Error::BadRequest(format!("file is not in the index: {rel}"))
        })?;

        if let Some(def) = self.db.symbol_at(self.project, &rel, line, col)? {
            return Ok((def.name, record.lang));
        }
        if let Some(usage) = self.db.ref_at(self.project, &rel, line, col)? {
            return Ok((usage.name, record.lang));
        }

        Err(Error::BadRequest(format!(
            "no identifier at {rel}:{line}:{col}"
        )))
    }

    /// The language of an indexed file.
    pub fn language_of(&self, path: &str) -> Result<Language> {
        let rel = self.normalize_path(path);
        self.db
            .get_file(self.project, &rel)?
            .map(|record| record.lang)
            .ok_or_else(|| Error::BadRequest(format!("file is not in the index: {rel}")))
    }

    /// Normalize a client-supplied path to repo-relative forward-slash
    /// form. Absolute paths inside the repository are stripped; anything
    /// else passes through unchanged.
    #[must_use]
    pub fn normalize_path(&self, path: &str) -> String {
        let p = Path::new(path);
        let rel = if p.is_absolute() {
            p.strip_prefix(self.repo_root).unwrap_or(p)
        } else {
            p
        };
        let s = rel.to_string_lossy().replace('\\', "/");
        s.trim_start_matches("./").to_string()
    }
}
