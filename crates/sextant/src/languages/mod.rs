//! Language registry: grammars, capture queries, and builtin tables.
//!
//! Each supported language contributes three things:
//!
//! 1. A native tree-sitter **grammar**.
//! 2. A declarative **capture query** over the concrete syntax tree, using
//!    the capture families `def.<kind>` (definition identifiers; the suffix
//!    maps one-to-one to [`SymbolKind`]), `ref.<role>` (reference
//!    identifiers), `container.name` (the enclosing scope bound to a
//!    definition in the same match), and `scope` (the declaration node a
//!    definition's span is taken from). Captures starting with `_` are
//!    query-internal.
//! 3. A **builtin table** for reference classification.
//!
//! The registry is a closed set over the [`Language`] enum: `spec_for` is
//! total, grammars load exactly once per process, and compiled queries are
//! cached in per-language slots.

pub mod extract;
pub mod spans;

mod go;
mod java;
mod javascript;
mod python;
mod rust;
mod typescript;

use std::sync::OnceLock;

use tree_sitter::Query;

use crate::error::{Error, Result};
use crate::types::{Language, SymbolKind};

/// Static description of one language's extraction support.
pub struct LanguageSpec {
    /// The language this spec serves.
    pub lang: Language,
    /// Grammar constructor; called once per process.
    pub(crate) grammar: fn() -> tree_sitter::Language,
    /// Capture query source.
    pub(crate) query_source: &'static str,
    /// Builtin / prelude names for reference classification.
    pub(crate) builtins: &'static [&'static str],
}

impl LanguageSpec {
    /// Whether a name is in this language's builtin table.
    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(&name)
    }
}

/// Look up the spec for a language. Total over the closed set.
#[must_use]
pub fn spec_for(lang: Language) -> &'static LanguageSpec {
    match lang {
        Language::Go => &go::SPEC,
        Language::Java => &java::SPEC,
        Language::Rust => &rust::SPEC,
        Language::Python => &python::SPEC,
        Language::TypeScript => &typescript::SPEC,
        Language::JavaScript => &javascript::SPEC,
    }
}

/// A loaded grammar plus its compiled capture query.
pub(crate) struct CompiledLanguage {
    pub language: tree_sitter::Language,
    pub query: Query,
}

fn lang_index(lang: Language) -> usize {
    match lang {
        Language::Go => 0,
        Language::Java => 1,
        Language::Rust => 2,
        Language::Python => 3,
        Language::TypeScript => 4,
        Language::JavaScript => 5,
    }
}

type Slot = OnceLock<std::result::Result<CompiledLanguage, String>>;

static COMPILED: [Slot; 6] = [const { OnceLock::new() }; 6];

/// Get the compiled query for a language, loading the grammar and
/// compiling the query on first use.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the query does not compile against the
/// grammar; the error is sticky for the process lifetime.
pub(crate) fn compiled(lang: Language) -> Result<&'static CompiledLanguage> {
    let entry = COMPILED[lang_index(lang)].get_or_init(|| {
        let spec = spec_for(lang);
        let language = (spec.grammar)();
        Query::new(&language, spec.query_source)
            .map(|query| CompiledLanguage { language, query })
            .map_err(|e| e.to_string())
    });

    entry
        .as_ref()
        .map_err(|e| Error::Parse(format!("compiling {lang} query: {e}")))
}

/// Resolve a `def.<suffix>` capture name to its symbol kind.
pub(crate) fn def_kind(capture_name: &str) -> Option<SymbolKind> {
    capture_name
        .strip_prefix("def.")
        .and_then(SymbolKind::from_capture_suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_for_is_total() {
        for lang in Language::ALL {
            let spec = spec_for(lang);
            assert_eq!(spec.lang, lang);
            assert!(!spec.query_source.is_empty());
            assert!(!spec.builtins.is_empty());
        }
    }

    #[test]
    fn every_query_compiles_against_its_grammar() {
        for lang in Language::ALL {
            compiled(lang).unwrap_or_else(|e| panic!("{lang}: {e}"));
        }
    }

    #[test]
    fn compiled_queries_are_cached() {
        let first = compiled(Language::Go).unwrap() as *const CompiledLanguage;
        let second = compiled(Language::Go).unwrap() as *const CompiledLanguage;
        assert_eq!(first, second);
    }

    #[test]
    fn def_kind_resolves_suffixes() {
        assert_eq!(def_kind("def.struct"), Some(SymbolKind::Struct));
        assert_eq!(def_kind("def.function"), Some(SymbolKind::Function));
        assert_eq!(def_kind("ref.call"), None);
        assert_eq!(def_kind("container.name"), None);
    }

    #[test]
    fn builtin_tables_classify_prelude_names() {
        assert!(spec_for(Language::Go).is_builtin("len"));
        assert!(spec_for(Language::Python).is_builtin("range"));
        assert!(spec_for(Language::Rust).is_builtin("Option"));
        assert!(spec_for(Language::TypeScript).is_builtin("Promise"));
        assert!(spec_for(Language::Java).is_builtin("String"));
        assert!(!spec_for(Language::Go).is_builtin("Config"));
    }
}
