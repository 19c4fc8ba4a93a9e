//! JavaScript extraction support.

use super::typescript::JS_BUILTINS;
use super::LanguageSpec;
use crate::types::Language;

/// Capture query for JavaScript. The prototype pattern recognizes
/// `Foo.prototype.bar = ...` extension assignments.
const QUERY: &str = r#"
(function_declaration name: (identifier) @def.function) @scope
(class_declaration name: (identifier) @def.class) @scope

(class_declaration
  name: (identifier) @container.name
  body: (class_body (method_definition name: (property_identifier) @def.method) @scope))
(class_declaration
  name: (identifier) @container.name
  body: (class_body (field_definition property: (property_identifier) @def.property) @scope))

(variable_declarator name: (identifier) @def.variable) @scope

(import_specifier name: (identifier) @ref.import)
(import_clause (identifier) @ref.import)
(namespace_import (identifier) @ref.import)

(class_heritage (identifier) @ref.inherit)

(decorator (identifier) @ref.annotation)
(decorator (call_expression function: (identifier) @ref.annotation))

(call_expression function: (identifier) @ref.call)
(call_expression function: (member_expression property: (property_identifier) @ref.call))

(new_expression constructor: (identifier) @ref.type)

(assignment_expression
  left: (member_expression
    object: (member_expression
      object: (identifier) @ref.prototype
      property: (property_identifier) @_proto))
  (#eq? @_proto "prototype"))

(member_expression object: (identifier) @ref.read)
(member_expression property: (property_identifier) @ref.property)

(assignment_expression left: (identifier) @ref.write)
(assignment_expression
  left: (member_expression property: (property_identifier) @ref.write))
"#;

pub(super) static SPEC: LanguageSpec = LanguageSpec {
    lang: Language::JavaScript,
    grammar: || tree_sitter_javascript::LANGUAGE.into(),
    query_source: QUERY,
    builtins: JS_BUILTINS,
};

#[cfg(test)]
mod tests {
    use crate::languages::extract::extract_source;
    use crate::types::{Language, RefKind, SymbolKind};

    const SOURCE: &str = "\
import { EventEmitter } from 'events';

class Hub extends EventEmitter {
  start() {
    console.log('up');
  }
}

function legacy() {}

legacy.prototype.run = function () {
  return new Hub();
};
";

    #[test]
    fn extracts_class_method_and_function() {
        let (symbols, _) = extract_source(Language::JavaScript, SOURCE).unwrap();

        let hub = symbols.iter().find(|s| s.name == "Hub").unwrap();
        assert_eq!(hub.kind, SymbolKind::Class);
        assert_eq!(hub.span.end_line, 7);

        let start = symbols.iter().find(|s| s.name == "start").unwrap();
        assert_eq!(start.kind, SymbolKind::Method);
        assert_eq!(start.container_name, "Hub");

        let legacy = symbols.iter().find(|s| s.name == "legacy").unwrap();
        assert_eq!(legacy.kind, SymbolKind::Function);
    }

    #[test]
    fn prototype_extension_is_recognized() {
        let (_, refs) = extract_source(Language::JavaScript, SOURCE).unwrap();

        let proto = refs
            .iter()
            .find(|r| r.relation.as_deref() == Some("prototype"))
            .unwrap();
        assert_eq!(proto.name, "legacy");
        assert_eq!(proto.kind, RefKind::TypeRef);
    }

    #[test]
    fn console_is_a_builtin_read() {
        let (_, refs) = extract_source(Language::JavaScript, SOURCE).unwrap();

        let console = refs
            .iter()
            .find(|r| r.name == "console" && r.kind == RefKind::Read)
            .unwrap();
        assert!(console.is_builtin);
        assert!(!console.is_external);
    }

    #[test]
    fn extends_and_import_share_the_name() {
        let (_, refs) = extract_source(Language::JavaScript, SOURCE).unwrap();

        let import = refs
            .iter()
            .find(|r| r.name == "EventEmitter" && r.kind == RefKind::Import)
            .unwrap();
        assert!(import.is_external);

        let inherit = refs
            .iter()
            .find(|r| r.name == "EventEmitter" && r.kind == RefKind::Inherit)
            .unwrap();
        assert!(inherit.is_external);
        assert_eq!(inherit.target_type.as_deref(), Some("EventEmitter"));
    }
}
