//! Python extraction support.

use super::LanguageSpec;
use crate::types::Language;

/// Capture query for Python. Method patterns (plain and decorated) come
/// before the module-level function catch-all so the method kind wins on
/// position collisions.
const QUERY: &str = r"
(class_definition name: (identifier) @def.class) @scope

(class_definition
  name: (identifier) @container.name
  body: (block (function_definition name: (identifier) @def.method) @scope))
(class_definition
  name: (identifier) @container.name
  body: (block
    (decorated_definition
      definition: (function_definition name: (identifier) @def.method) @scope)))

(function_definition name: (identifier) @def.function) @scope

(assignment left: (identifier) @def.variable) @scope
(assignment left: (pattern_list (identifier) @def.variable)) @scope

(import_statement name: (dotted_name (identifier) @ref.import))
(import_statement name: (aliased_import name: (dotted_name (identifier) @ref.import)))
(import_from_statement name: (dotted_name (identifier) @ref.import))
(import_from_statement name: (aliased_import name: (dotted_name (identifier) @ref.import)))

(decorator (identifier) @ref.annotation)
(decorator (attribute attribute: (identifier) @ref.annotation))
(decorator (call function: (identifier) @ref.annotation))
(decorator (call function: (attribute attribute: (identifier) @ref.annotation)))

(class_definition superclasses: (argument_list (identifier) @ref.inherit))
(class_definition superclasses: (argument_list (attribute attribute: (identifier) @ref.inherit)))

(call function: (identifier) @ref.call)
(call function: (attribute attribute: (identifier) @ref.call))

(attribute object: (identifier) @ref.read)
(attribute attribute: (identifier) @ref.attribute)
(assignment left: (attribute attribute: (identifier) @ref.write))

(type (identifier) @ref.type)
";

/// Frequently used builtins; matches `builtins` module coverage for the
/// names that show up in real code.
const BUILTINS: &[&str] = &[
    "Exception", "False", "IndexError", "KeyError", "None", "NotImplementedError", "RuntimeError",
    "StopIteration", "True", "TypeError", "ValueError", "abs", "all", "any", "bool", "bytes",
    "callable", "classmethod", "dict", "enumerate", "filter", "float", "format", "frozenset",
    "getattr", "hasattr", "hash", "int", "isinstance", "issubclass", "iter", "len", "list",
    "map", "max", "min", "next", "object", "open", "print", "property", "range", "repr",
    "reversed", "round", "set", "setattr", "sorted", "staticmethod", "str", "sum", "super",
    "tuple", "type", "zip",
];

pub(super) static SPEC: LanguageSpec = LanguageSpec {
    lang: Language::Python,
    grammar: || tree_sitter_python::LANGUAGE.into(),
    query_source: QUERY,
    builtins: BUILTINS,
};
