//! TypeScript extraction support.
//!
//! The plain TypeScript grammar also covers `.tsx` input; tree-sitter's
//! error recovery keeps extraction usable on the JSX fragments it cannot
//! parse precisely.

use super::LanguageSpec;
use crate::types::Language;

/// Capture query for TypeScript.
const QUERY: &str = r#"
(function_declaration name: (identifier) @def.function) @scope
(class_declaration name: (type_identifier) @def.class) @scope

(class_declaration
  name: (type_identifier) @container.name
  body: (class_body (method_definition name: (property_identifier) @def.method) @scope))
(class_declaration
  name: (type_identifier) @container.name
  body: (class_body (public_field_definition name: (property_identifier) @def.property) @scope))

(interface_declaration name: (type_identifier) @def.interface) @scope
(enum_declaration name: (identifier) @def.enum) @scope
(type_alias_declaration name: (type_identifier) @def.type_alias) @scope
(variable_declarator name: (identifier) @def.variable) @scope

(import_specifier name: (identifier) @ref.import)
(import_clause (identifier) @ref.import)
(namespace_import (identifier) @ref.import)

(extends_clause value: (identifier) @ref.inherit)
(extends_type_clause type: (type_identifier) @ref.inherit)
(implements_clause (type_identifier) @ref.implements)

(decorator (identifier) @ref.annotation)
(decorator (call_expression function: (identifier) @ref.annotation))

(call_expression function: (identifier) @ref.call)
(call_expression function: (member_expression property: (property_identifier) @ref.call))

(new_expression constructor: (identifier) @ref.type)

(member_expression object: (identifier) @ref.read)
(member_expression property: (property_identifier) @ref.property)

(assignment_expression left: (identifier) @ref.write)
(assignment_expression
  left: (member_expression property: (property_identifier) @ref.write))

(type_identifier) @ref.type
"#;

/// Ambient globals shared by TypeScript and JavaScript code.
pub(super) const JS_BUILTINS: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "Infinity", "JSON", "Map", "Math", "NaN", "Number",
    "Object", "Promise", "Proxy", "RangeError", "Reflect", "RegExp", "Set", "String", "Symbol",
    "TypeError", "WeakMap", "WeakSet", "clearInterval", "clearTimeout", "console", "decodeURI",
    "document", "encodeURI", "fetch", "globalThis", "isFinite", "isNaN", "module", "parseFloat",
    "parseInt", "process", "require", "setInterval", "setTimeout", "structuredClone", "window",
];

pub(super) static SPEC: LanguageSpec = LanguageSpec {
    lang: Language::TypeScript,
    grammar: || tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    query_source: QUERY,
    builtins: JS_BUILTINS,
};

#[cfg(test)]
mod tests {
    use crate::languages::extract::extract_source;
    use crate::types::{Language, RefKind, SymbolKind};

    const SOURCE: &str = "\
import { BaseStore } from './base';

export interface Entry {
  key: string;
}

export class MemoryStore extends BaseStore implements Disposable {
  private entries: Entry[] = [];

  add(entry: Entry): void {
    this.entries.push(entry);
  }
}

const DEFAULT_LIMIT = 100;

export function makeStore(): MemoryStore {
  return new MemoryStore();
}
";

    #[test]
    fn extracts_interface_class_and_members() {
        let (symbols, _) = extract_source(Language::TypeScript, SOURCE).unwrap();

        let iface = symbols.iter().find(|s| s.name == "Entry").unwrap();
        assert_eq!(iface.kind, SymbolKind::Interface);
        assert_eq!(iface.span.end_line, 5);

        let class = symbols.iter().find(|s| s.name == "MemoryStore").unwrap();
        assert_eq!(class.kind, SymbolKind::Class);

        let add = symbols.iter().find(|s| s.name == "add").unwrap();
        assert_eq!(add.kind, SymbolKind::Method);
        assert_eq!(add.container_name, "MemoryStore");

        let entries = symbols.iter().find(|s| s.name == "entries").unwrap();
        assert_eq!(entries.kind, SymbolKind::Property);

        let limit = symbols.iter().find(|s| s.name == "DEFAULT_LIMIT").unwrap();
        assert_eq!(limit.kind, SymbolKind::Variable);

        let make = symbols.iter().find(|s| s.name == "makeStore").unwrap();
        assert_eq!(make.kind, SymbolKind::Function);
    }

    #[test]
    fn heritage_and_imports_classify() {
        let (_, refs) = extract_source(Language::TypeScript, SOURCE).unwrap();

        let imp = refs
            .iter()
            .find(|r| r.name == "BaseStore" && r.kind == RefKind::Import)
            .unwrap();
        assert!(imp.is_external);

        let extends = refs
            .iter()
            .find(|r| r.name == "BaseStore" && r.kind == RefKind::Inherit)
            .unwrap();
        assert_eq!(extends.relation.as_deref(), Some("inherits"));
        assert!(extends.is_external);

        let implements = refs
            .iter()
            .find(|r| r.name == "Disposable" && r.kind == RefKind::Inherit)
            .unwrap();
        assert_eq!(implements.relation.as_deref(), Some("implements"));
    }

    #[test]
    fn constructor_use_is_a_type_ref() {
        let (_, refs) = extract_source(Language::TypeScript, SOURCE).unwrap();

        let ctor = refs
            .iter()
            .find(|r| r.name == "MemoryStore" && r.kind == RefKind::TypeRef)
            .unwrap();
        assert_eq!(ctor.context_container, "makeStore");
    }

    #[test]
    fn member_calls_record_receiver() {
        let (_, refs) = extract_source(Language::TypeScript, SOURCE).unwrap();

        let push = refs
            .iter()
            .find(|r| r.name == "push" && r.kind == RefKind::Call)
            .unwrap();
        assert_eq!(push.context_container, "add");
    }
}
