//! Java extraction support.

use super::LanguageSpec;
use crate::types::Language;

/// Capture query for Java. Member patterns carry the declaring type as
/// `container.name`; the bare `method_declaration` catch-all comes last.
const QUERY: &str = r"
(class_declaration name: (identifier) @def.class) @scope
(interface_declaration name: (identifier) @def.interface) @scope
(enum_declaration name: (identifier) @def.enum) @scope
(record_declaration name: (identifier) @def.class) @scope

(class_declaration
  name: (identifier) @container.name
  body: (class_body (method_declaration name: (identifier) @def.method) @scope))
(class_declaration
  name: (identifier) @container.name
  body: (class_body (constructor_declaration name: (identifier) @def.constructor) @scope))
(class_declaration
  name: (identifier) @container.name
  body: (class_body
    (field_declaration declarator: (variable_declarator name: (identifier) @def.field)) @scope))
(interface_declaration
  name: (identifier) @container.name
  body: (interface_body (method_declaration name: (identifier) @def.method) @scope))

(method_declaration name: (identifier) @def.method) @scope
(local_variable_declaration
  declarator: (variable_declarator name: (identifier) @def.variable)) @scope

(import_declaration (scoped_identifier name: (identifier) @ref.import))
(import_declaration (identifier) @ref.import)

(superclass (type_identifier) @ref.inherit)
(super_interfaces (type_list (type_identifier) @ref.implements))

(marker_annotation name: (identifier) @ref.annotation)
(annotation name: (identifier) @ref.annotation)

(method_invocation name: (identifier) @ref.call)
(method_invocation object: (identifier) @ref.read)
(object_creation_expression type: (type_identifier) @ref.type)
(field_access field: (identifier) @ref.field)
(assignment_expression left: (identifier) @ref.write)

(type_identifier) @ref.type
";

/// Core `java.lang` types plus primitives-adjacent wrappers.
const BUILTINS: &[&str] = &[
    "Boolean", "Byte", "Character", "Class", "Comparable", "Double", "Enum", "Error", "Exception",
    "Float", "Integer", "Iterable", "Long", "Math", "Number", "Object", "Override", "Runnable",
    "RuntimeException", "Short", "String", "StringBuffer", "StringBuilder", "System", "Thread",
    "Throwable", "Void",
];

pub(super) static SPEC: LanguageSpec = LanguageSpec {
    lang: Language::Java,
    grammar: || tree_sitter_java::LANGUAGE.into(),
    query_source: QUERY,
    builtins: BUILTINS,
};
