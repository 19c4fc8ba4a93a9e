//! CLI command implementations.

mod display;

pub mod code;
pub mod definition;
pub mod graph;
pub mod index;
pub mod info;
pub mod reconcile;
pub mod refs;
pub mod stats;
pub mod usages;
pub mod watch;

use std::path::Path;

use sextant::{Error, Language, Sextant};

/// What a query command is aimed at: a bare name or a cursor position.
#[derive(Debug)]
pub enum Target {
    /// Query by name in a given language.
    Name(String, Language),
    /// Query by file position (1-based line, 0-based column).
    Position {
        /// Repo-relative or absolute file path
        file: String,
        /// 1-based line
        line: u32,
        /// 0-based column
        col: u32,
    },
}

/// Resolve query arguments into a [`Target`].
///
/// # Errors
///
/// Mirrors the engine's bad-request taxonomy: neither a position nor a
/// name, a name without a language, or an unknown language tag.
pub fn resolve_target(
    name: Option<&str>,
    lang: Option<&str>,
    file: Option<&str>,
    line: Option<u32>,
    col: Option<u32>,
) -> Result<Target, Error> {
    if let (Some(file), Some(line)) = (file, line) {
        return Ok(Target::Position {
            file: file.to_string(),
            line,
            col: col.unwrap_or(0),
        });
    }

    if let Some(name) = name {
        let tag = lang.ok_or_else(|| {
            Error::BadRequest("a name query needs --lang (go, java, rust, python, typescript, javascript)".to_string())
        })?;
        let lang = parse_lang(tag)?;
        return Ok(Target::Name(name.to_string(), lang));
    }

    Err(Error::BadRequest(
        "give either NAME --lang <lang> or --file <path> --line <n> [--col <n>]".to_string(),
    ))
}

/// Parse a language tag, surfacing unknown tags as bad requests.
pub fn parse_lang(tag: &str) -> Result<Language, Error> {
    Language::from_tag(tag)
        .ok_or_else(|| Error::BadRequest(format!("unknown language tag: {tag}")))
}

/// Open the engine read-only for query commands.
///
/// Queries never need the writer lock, so a live writer elsewhere does
/// not block them.
pub fn open_read_only(repo: &Path) -> Result<Sextant, Error> {
    Sextant::open_read_only(repo)
}

/// Open the engine writable for indexing commands.
pub fn open_writable(repo: &Path) -> Result<Sextant, Error> {
    Sextant::open(repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_takes_precedence() {
        let target = resolve_target(Some("Foo"), Some("go"), Some("a.go"), Some(3), Some(5));
        assert!(matches!(target, Ok(Target::Position { .. })));
    }

    #[test]
    fn name_requires_lang() {
        assert!(resolve_target(Some("Foo"), None, None, None, None).is_err());
        assert!(resolve_target(Some("Foo"), Some("go"), None, None, None).is_ok());
    }

    #[test]
    fn neither_is_a_bad_request() {
        let err = resolve_target(None, None, None, None, None).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn unknown_lang_is_a_bad_request() {
        let err = resolve_target(Some("Foo"), Some("cobol"), None, None, None).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
