//! Rust extraction support.

use super::LanguageSpec;
use crate::types::Language;

/// Capture query for Rust. Inherent and trait impl methods bind the
/// implemented type as `container.name`.
const QUERY: &str = r"
(function_item name: (identifier) @def.function) @scope

(impl_item
  type: (type_identifier) @container.name
  body: (declaration_list (function_item name: (identifier) @def.method) @scope))
(impl_item
  type: (generic_type type: (type_identifier) @container.name)
  body: (declaration_list (function_item name: (identifier) @def.method) @scope))
(trait_item
  name: (type_identifier) @container.name
  body: (declaration_list (function_item name: (identifier) @def.method) @scope))
(trait_item
  name: (type_identifier) @container.name
  body: (declaration_list (function_signature_item name: (identifier) @def.method) @scope))

(struct_item name: (type_identifier) @def.struct) @scope
(enum_item name: (type_identifier) @def.enum) @scope
(trait_item name: (type_identifier) @def.trait) @scope
(mod_item name: (identifier) @def.module) @scope
(const_item name: (identifier) @def.constant) @scope
(static_item name: (identifier) @def.variable) @scope
(type_item name: (type_identifier) @def.type_alias) @scope
(field_declaration name: (field_identifier) @def.field) @scope
(let_declaration pattern: (identifier) @def.variable) @scope

(use_declaration argument: (identifier) @ref.import)
(use_declaration argument: (scoped_identifier name: (identifier) @ref.import))
(use_list (identifier) @ref.import)
(use_list (scoped_identifier name: (identifier) @ref.import))

(call_expression function: (identifier) @ref.call)
(call_expression function: (scoped_identifier name: (identifier) @ref.call))
(call_expression function: (field_expression field: (field_identifier) @ref.call))
(macro_invocation macro: (identifier) @ref.call)

(impl_item trait: (type_identifier) @ref.implements)

(attribute (identifier) @ref.annotation)

(field_expression field: (field_identifier) @ref.field)
(assignment_expression left: (identifier) @ref.write)
(struct_expression name: (type_identifier) @ref.type)
(scoped_identifier path: (identifier) @ref.read)

(type_identifier) @ref.type
";

/// Prelude names and ubiquitous std items.
const BUILTINS: &[&str] = &[
    "Arc", "AsMut", "AsRef", "Box", "Clone", "Copy", "Debug", "Default", "Drop", "Eq", "Err",
    "From", "HashMap", "HashSet", "Into", "Iterator", "None", "Ok", "Option", "Ord", "PartialEq",
    "PartialOrd", "Rc", "Result", "Send", "Sized", "Some", "String", "Sync", "ToString",
    "TryFrom", "TryInto", "Vec", "assert", "format", "panic", "println", "todo", "vec",
    "write", "writeln",
];

pub(super) static SPEC: LanguageSpec = LanguageSpec {
    lang: Language::Rust,
    grammar: || tree_sitter_rust::LANGUAGE.into(),
    query_source: QUERY,
    builtins: BUILTINS,
};

#[cfg(test)]
mod tests {
    use crate::languages::extract::extract_source;
    use crate::types::{Language, RefKind, SymbolKind};

    const SOURCE: &str = "\
use std::collections::HashMap;

/// Tracks open sessions.
pub struct Registry {
    entries: HashMap<String, u32>,
}

impl Registry {
    pub fn insert(&mut self, key: String) {
        self.entries.insert(key, 1);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry { entries: HashMap::new() }
    }
}
";

    #[test]
    fn extracts_struct_and_methods() {
        let (symbols, _) = extract_source(Language::Rust, SOURCE).unwrap();

        let registry = symbols.iter().find(|s| s.name == "Registry").unwrap();
        assert_eq!(registry.kind, SymbolKind::Struct);
        assert_eq!(registry.span.start_line, 4);
        assert_eq!(registry.span.end_line, 6);

        let insert = symbols
            .iter()
            .find(|s| s.name == "insert" && s.kind == SymbolKind::Method)
            .unwrap();
        assert_eq!(insert.container_name, "Registry");

        let default = symbols
            .iter()
            .find(|s| s.name == "default" && s.kind == SymbolKind::Method)
            .unwrap();
        assert_eq!(default.container_name, "Registry");

        let field = symbols.iter().find(|s| s.name == "entries").unwrap();
        assert_eq!(field.kind, SymbolKind::Field);
    }

    #[test]
    fn trait_impl_records_implements() {
        let (_, refs) = extract_source(Language::Rust, SOURCE).unwrap();

        let implements = refs
            .iter()
            .find(|r| r.name == "Default" && r.kind == RefKind::Inherit)
            .unwrap();
        assert_eq!(implements.relation.as_deref(), Some("implements"));
    }

    #[test]
    fn prelude_types_are_builtin_not_external() {
        let (_, refs) = extract_source(Language::Rust, SOURCE).unwrap();

        let import = refs
            .iter()
            .find(|r| r.name == "HashMap" && r.kind == RefKind::Import)
            .unwrap();
        assert!(import.is_external);

        let type_use = refs
            .iter()
            .find(|r| r.name == "HashMap" && r.kind == RefKind::TypeRef)
            .unwrap();
        assert!(type_use.is_builtin);
        assert!(!type_use.is_external);
    }

    #[test]
    fn method_call_context_is_enclosing_function() {
        let (_, refs) = extract_source(Language::Rust, SOURCE).unwrap();

        let call = refs
            .iter()
            .find(|r| r.name == "insert" && r.kind == RefKind::Call)
            .unwrap();
        assert_eq!(call.context_container, "insert");
    }

    #[test]
    fn struct_literal_is_a_type_ref() {
        let (_, refs) = extract_source(Language::Rust, SOURCE).unwrap();

        assert!(refs
            .iter()
            .any(|r| r.name == "Registry" && r.kind == RefKind::TypeRef));
    }
}
