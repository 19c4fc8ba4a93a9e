//! Go extraction support.

use super::LanguageSpec;
use crate::types::Language;

/// Capture query for Go.
///
/// Specific `type_spec` patterns come before the `type_alias` catch-all;
/// on a position collision the first definition wins.
const QUERY: &str = r#"
(package_clause (package_identifier) @def.package) @scope

(function_declaration name: (identifier) @def.function) @scope

(method_declaration
  receiver: (parameter_list
    (parameter_declaration
      type: [
        (type_identifier) @container.name
        (pointer_type (type_identifier) @container.name)
      ]))
  name: (field_identifier) @def.method) @scope

(type_declaration (type_spec name: (type_identifier) @def.struct type: (struct_type)) @scope)
(type_declaration (type_spec name: (type_identifier) @def.interface type: (interface_type)) @scope)
(type_declaration (type_spec name: (type_identifier) @def.type_alias) @scope)
(type_declaration (type_alias name: (type_identifier) @def.type_alias) @scope)

(type_spec
  name: (type_identifier) @container.name
  type: (struct_type
    (field_declaration_list
      (field_declaration name: (field_identifier) @def.field) @scope)))

(const_declaration (const_spec name: (identifier) @def.constant) @scope)
(var_declaration (var_spec name: (identifier) @def.variable) @scope)
(short_var_declaration left: (expression_list (identifier) @def.variable)) @scope

(import_spec path: (interpreted_string_literal) @ref.import)

(call_expression function: (identifier) @ref.call)
(call_expression function: (selector_expression field: (field_identifier) @ref.call))

(selector_expression operand: (identifier) @ref.read)
(selector_expression field: (field_identifier) @ref.field)

(assignment_statement left: (expression_list (identifier) @ref.write))

(type_identifier) @ref.type
"#;

/// Predeclared identifiers from the Go spec.
const BUILTINS: &[&str] = &[
    "append", "bool", "byte", "cap", "clear", "close", "complex", "complex128", "complex64",
    "copy", "delete", "error", "false", "float32", "float64", "imag", "int", "int16", "int32",
    "int64", "int8", "iota", "len", "make", "max", "min", "new", "nil", "panic", "print",
    "println", "recover", "rune", "string", "true", "uint", "uint16", "uint32", "uint64",
    "uint8", "uintptr",
];

pub(super) static SPEC: LanguageSpec = LanguageSpec {
    lang: Language::Go,
    grammar: || tree_sitter_go::LANGUAGE.into(),
    query_source: QUERY,
    builtins: BUILTINS,
};

#[cfg(test)]
mod tests {
    use crate::languages::extract::extract_source;
    use crate::types::{Language, RefKind, SymbolKind};

    #[test]
    fn extracts_struct_with_block_span() {
        let source = "\npackage demo\n\n// Foo holds state.\ntype Foo struct {\n\tAddr string\n}\n";
        let (symbols, _refs) = extract_source(Language::Go, source).unwrap();

        let foo = symbols.iter().find(|s| s.name == "Foo").unwrap();
        assert_eq!(foo.kind, SymbolKind::Struct);
        assert_eq!(foo.span.start_line, 5);
        assert_eq!(foo.span.end_line, 7);

        let field = symbols.iter().find(|s| s.name == "Addr").unwrap();
        assert_eq!(field.kind, SymbolKind::Field);
        assert_eq!(field.container_name, "Foo");
    }

    #[test]
    fn method_receiver_becomes_container() {
        let source = "package demo\n\ntype Server struct{}\n\nfunc (s *Server) Start() error {\n\treturn nil\n}\n";
        let (symbols, _) = extract_source(Language::Go, source).unwrap();

        let start = symbols.iter().find(|s| s.name == "Start").unwrap();
        assert_eq!(start.kind, SymbolKind::Method);
        assert_eq!(start.container_name, "Server");
        assert_eq!(start.span.end_line, 7);
    }

    #[test]
    fn import_ref_takes_last_path_segment() {
        let source = "package demo\n\nimport \"net/http\"\n\nfunc f() { http.Get(\"\") }\n";
        let (_, refs) = extract_source(Language::Go, source).unwrap();

        let imp = refs.iter().find(|r| r.kind == RefKind::Import).unwrap();
        assert_eq!(imp.name, "http");
        assert!(imp.is_external);
        assert!(!imp.is_builtin);
    }

    #[test]
    fn import_introduced_name_is_external() {
        let source = "package demo\n\nimport \"fmt\"\n\nfunc f() {\n\tfmt.Println(1)\n}\n";
        let (_, refs) = extract_source(Language::Go, source).unwrap();

        let fmt_use = refs
            .iter()
            .find(|r| r.name == "fmt" && r.kind != RefKind::Import)
            .unwrap();
        assert!(fmt_use.is_external);

        let call = refs
            .iter()
            .find(|r| r.name == "Println" && r.kind == RefKind::Call)
            .unwrap();
        assert_eq!(call.receiver_type.as_deref(), Some("fmt"));
        assert_eq!(call.context_container, "f");
    }

    #[test]
    fn builtin_calls_are_flagged() {
        let source = "package demo\n\nfunc f(xs []int) int {\n\treturn len(xs)\n}\n";
        let (_, refs) = extract_source(Language::Go, source).unwrap();

        let len_call = refs.iter().find(|r| r.name == "len").unwrap();
        assert_eq!(len_call.kind, RefKind::Call);
        assert!(len_call.is_builtin);
        assert!(!len_call.is_external);
    }

    #[test]
    fn definition_is_not_its_own_reference() {
        let source = "package demo\n\ntype Foo struct{}\n\nfunc UseFoo(f Foo) {}\n";
        let (symbols, refs) = extract_source(Language::Go, source).unwrap();

        let def = symbols.iter().find(|s| s.name == "Foo").unwrap();
        assert!(
            !refs.iter().any(|r| r.span.start_line == def.span.start_line
                && r.span.start_col == def.span.start_col),
            "definition position leaked into refs"
        );
        // The parameter type is still a reference.
        assert!(refs
            .iter()
            .any(|r| r.name == "Foo" && r.kind == RefKind::TypeRef));
    }
}
