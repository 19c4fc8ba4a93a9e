//! Three-pass extraction of symbols and references from one file.
//!
//! Pass 1 collects `def.*` and `ref.*` captures from the query match
//! stream, together with each match's `container.name` and `scope`
//! captures. Pass 2 emits deduplicated definitions and records their
//! positions. Pass 3 emits references in position order, skipping
//! definition positions, applying semantic-priority dedup per position,
//! and classifying builtin/external names.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, Parser, QueryCursor, StreamingIterator, Tree};

use super::{compiled, def_kind, spans, spec_for};
use crate::error::{Error, Result};
use crate::parallel::{ExtractedRef, ExtractedSymbol};
use crate::types::{Language, RefKind, Span, SymbolKind};

/// Names never emitted as definitions or references. These are keyword-ish
/// tokens that some grammars expose as plain identifiers.
const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "continue", "default", "defer", "do", "elif", "else", "except",
    "false", "finally", "for", "if", "nil", "null", "pass", "return", "self", "super", "switch",
    "this", "true", "try", "undefined", "while",
];

/// Maximum stored signature length; longer declaration lines are cut.
const MAX_SIGNATURE_LEN: usize = 200;

struct RawDef {
    name: String,
    kind: SymbolKind,
    line: u32,
    col: u32,
    container: String,
    /// `(start_line, end_line, end_col)` of the enclosing declaration node.
    scope: Option<(u32, u32, u32)>,
}

struct RawRef {
    name: String,
    role: &'static str,
    line: u32,
    col: u32,
    receiver: Option<String>,
    context: String,
}

/// Extract symbols and references from source text.
///
/// # Errors
///
/// Fails when the grammar/query infrastructure fails or the file cannot be
/// parsed at all; syntactically broken files still extract whatever the
/// error-tolerant tree exposes.
pub fn extract_source(
    lang: Language,
    source: &str,
) -> Result<(Vec<ExtractedSymbol>, Vec<ExtractedRef>)> {
    let compiled = compiled(lang)?;
    let tree = parse_source(&compiled.language, source)?;
    let lines: Vec<&str> = source.lines().collect();

    let (raw_defs, raw_refs) = collect_captures(lang, &compiled.query, &tree, source);

    let (symbols, def_positions) = emit_definitions(lang, raw_defs, &lines);
    let refs = emit_references(lang, raw_refs, &def_positions);

    Ok((symbols, refs))
}

/// Parse with a thread-local parser to avoid re-initialization overhead in
/// the worker pool.
fn parse_source(language: &tree_sitter::Language, source: &str) -> Result<Tree> {
    thread_local! {
        static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
    }

    PARSER.with(|parser| {
        let mut parser = parser.try_borrow_mut().map_err(|_| {
            Error::Parse("thread-local parser already borrowed (re-entrant call?)".to_string())
        })?;
        parser
            .set_language(language)
            .map_err(|e| Error::Parse(format!("failed to set language: {e}")))?;
        parser
            .parse(source, None)
            .ok_or_else(|| Error::Parse("failed to parse file".to_string()))
    })
}

/// Pass 1: walk the match stream and collect raw captures.
fn collect_captures(
    lang: Language,
    query: &'static tree_sitter::Query,
    tree: &Tree,
    source: &str,
) -> (Vec<RawDef>, Vec<RawRef>) {
    let mut raw_defs = Vec::new();
    let mut raw_refs = Vec::new();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());

    while let Some(m) = matches.next() {
        let mut container = String::new();
        let mut scope: Option<(u32, u32, u32)> = None;

        for capture in m.captures {
            let capture_name = query.capture_names()[capture.index as usize];
            match capture_name {
                "container.name" => {
                    container = node_text(capture.node, source).to_string();
                }
                "scope" => {
                    scope = Some(node_extent(capture.node));
                }
                _ => {}
            }
        }

        for capture in m.captures {
            let capture_name = query.capture_names()[capture.index as usize];
            let node = capture.node;

            if let Some(kind) = def_kind(capture_name) {
                #[allow(clippy::cast_possible_truncation)]
                raw_defs.push(RawDef {
                    name: node_text(node, source).to_string(),
                    kind,
                    line: node.start_position().row as u32 + 1,
                    col: node.start_position().column as u32,
                    container: container.clone(),
                    scope: scope.or_else(|| node.parent().map(node_extent)),
                });
            } else if let Some(role) = capture_name.strip_prefix("ref.") {
                let name = normalize_ref_name(lang, role, node_text(node, source));
                if name.is_empty() {
                    continue;
                }
                #[allow(clippy::cast_possible_truncation)]
                raw_refs.push(RawRef {
                    name,
                    role,
                    line: node.start_position().row as u32 + 1,
                    col: node.start_position().column as u32,
                    receiver: receiver_of(node, source),
                    context: enclosing_container(node, source),
                });
            }
        }
    }

    (raw_defs, raw_refs)
}

/// Pass 2: emit deduplicated definitions and record their positions.
///
/// Dedup is positional with a specificity refinement: the first definition
/// at a position wins unless a later capture brings a non-empty container
/// the first one lacked (nested member patterns beat bare catch-alls).
fn emit_definitions(
    lang: Language,
    raw_defs: Vec<RawDef>,
    lines: &[&str],
) -> (Vec<ExtractedSymbol>, HashSet<(u32, u32)>) {
    let mut symbols: Vec<ExtractedSymbol> = Vec::new();
    let mut by_position: HashMap<(u32, u32), usize> = HashMap::new();
    let mut def_positions: HashSet<(u32, u32)> = HashSet::new();

    for raw in raw_defs {
        if raw.name.chars().count() <= 1 || KEYWORDS.contains(&raw.name.as_str()) {
            continue;
        }

        let mut kind = raw.kind;
        if lang == Language::Python && kind == SymbolKind::Variable && is_upper_case(&raw.name) {
            kind = SymbolKind::Constant;
        }

        let span = definition_span(lang, &raw, lines);
        let signature = if kind.is_callable() {
            declaration_signature(lines, span.start_line)
        } else {
            None
        };

        let symbol = ExtractedSymbol {
            name: raw.name,
            kind,
            container_name: raw.container,
            signature,
            span,
        };

        def_positions.insert((span.start_line, span.start_col));
        match by_position.entry((span.start_line, span.start_col)) {
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(symbols.len());
                symbols.push(symbol);
            }
            std::collections::hash_map::Entry::Occupied(entry) => {
                let existing = &mut symbols[*entry.get()];
                if existing.container_name.is_empty() && !symbol.container_name.is_empty() {
                    *existing = symbol;
                }
            }
        }
    }

    symbols.sort_by_key(|s| (s.span.start_line, s.span.start_col));
    (symbols, def_positions)
}

/// Full declaration span for a definition: identifier start, enclosing
/// declaration end. Degenerate single-line scopes fall back to the textual
/// block-end scan.
fn definition_span(lang: Language, raw: &RawDef, lines: &[&str]) -> Span {
    #[allow(clippy::cast_possible_truncation)]
    let name_end = raw.col + raw.name.len() as u32;

    match raw.scope {
        Some((_, end_line, end_col)) if end_line > raw.line => Span {
            start_line: raw.line,
            start_col: raw.col,
            end_line,
            end_col,
        },
        _ => {
            let end_line = spans::block_end(lang, lines, raw.line);
            let end_col = if end_line == raw.line {
                name_end
            } else {
                #[allow(clippy::cast_possible_truncation)]
                let len = lines
                    .get((end_line - 1) as usize)
                    .map_or(0, |l| l.len() as u32);
                len
            };
            Span {
                start_line: raw.line,
                start_col: raw.col,
                end_line,
                end_col,
            }
        }
    }
}

/// The trimmed declaration line, without a trailing block opener.
fn declaration_signature(lines: &[&str], decl_line: u32) -> Option<String> {
    let line = lines.get(decl_line.saturating_sub(1) as usize)?;
    let sig = line
        .trim()
        .trim_end_matches('{')
        .trim_end_matches(':')
        .trim_end();
    if sig.is_empty() {
        return None;
    }
    let mut sig = sig.to_string();
    if sig.len() > MAX_SIGNATURE_LEN {
        sig.truncate(MAX_SIGNATURE_LEN);
    }
    Some(sig)
}

/// Pass 3: emit references in position order.
fn emit_references(
    lang: Language,
    mut raw_refs: Vec<RawRef>,
    def_positions: &HashSet<(u32, u32)>,
) -> Vec<ExtractedRef> {
    let spec = spec_for(lang);

    raw_refs.sort_by(|a, b| {
        (a.line, a.col)
            .cmp(&(b.line, b.col))
            .then_with(|| role_priority(b.role).cmp(&role_priority(a.role)))
    });

    let mut refs: Vec<ExtractedRef> = Vec::new();
    let mut by_position: HashMap<(u32, u32), (u8, usize)> = HashMap::new();
    let mut import_names: HashSet<String> = HashSet::new();

    for raw in raw_refs {
        if def_positions.contains(&(raw.line, raw.col)) {
            continue;
        }
        if KEYWORDS.contains(&raw.name.as_str()) {
            continue;
        }

        let (kind, relation) = role_info(raw.role);
        let priority = role_priority(raw.role);
        let is_builtin = spec.is_builtin(&raw.name);
        let is_external =
            kind == RefKind::Import || (!is_builtin && import_names.contains(&raw.name));

        if kind == RefKind::Import {
            import_names.insert(raw.name.clone());
        }

        let entry = ExtractedRef {
            span: Span::for_identifier(raw.line, raw.col, &raw.name),
            target_type: (kind == RefKind::Inherit).then(|| raw.name.clone()),
            relation: relation.map(str::to_string),
            receiver_type: raw.receiver,
            context_container: raw.context,
            name: raw.name,
            kind,
            is_external,
            is_builtin,
        };

        match by_position.entry((raw.line, raw.col)) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert((priority, refs.len()));
                refs.push(entry);
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let (existing_priority, idx) = *slot.get();
                if priority > existing_priority {
                    refs[idx] = entry;
                    slot.insert((priority, idx));
                }
            }
        }
    }

    refs
}

/// Map a `ref.<role>` capture role to its stored kind and relation.
fn role_info(role: &str) -> (RefKind, Option<&'static str>) {
    match role {
        "implements" => (RefKind::Inherit, Some("implements")),
        "inherit" => (RefKind::Inherit, Some("inherits")),
        "annotation" => (RefKind::Annotation, Some("annotation")),
        "call" => (RefKind::Call, None),
        "write" => (RefKind::Write, None),
        "import" => (RefKind::Import, None),
        "type" => (RefKind::TypeRef, None),
        "prototype" => (RefKind::TypeRef, Some("prototype")),
        "attribute" | "field" | "property" | "read" => (RefKind::Read, None),
        _ => (RefKind::Other, None),
    }
}

/// Semantic priority for per-position dedup; highest wins.
fn role_priority(role: &str) -> u8 {
    match role {
        "implements" => 80,
        "inherit" => 70,
        "annotation" => 60,
        "call" => 50,
        "write" => 40,
        "import" => 30,
        "type" | "prototype" => 20,
        "attribute" | "field" | "property" | "read" => 10,
        _ => 0,
    }
}

/// Normalize a captured reference name.
///
/// Go import paths are string literals: strip the quotes and keep the last
/// slash-delimited segment (`"net/http"` imports `http`).
fn normalize_ref_name(lang: Language, role: &str, text: &str) -> String {
    if lang == Language::Go && role == "import" {
        let unquoted = text.trim_matches('"').trim_matches('`');
        return unquoted
            .rsplit('/')
            .next()
            .unwrap_or(unquoted)
            .to_string();
    }
    text.to_string()
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// `(start_line, end_line, end_col)` of a node, 1-based lines.
#[allow(clippy::cast_possible_truncation)]
fn node_extent(node: Node) -> (u32, u32, u32) {
    (
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
        node.end_position().column as u32,
    )
}

/// Receiver expression of a member access, when it is a plain identifier
/// preceding the referenced name.
fn receiver_of(node: Node, source: &str) -> Option<String> {
    let parent = node.parent()?;
    let object = parent
        .child_by_field_name("object")
        .or_else(|| parent.child_by_field_name("operand"))
        .or_else(|| parent.child_by_field_name("value"))?;
    if object.start_byte() >= node.start_byte() {
        return None;
    }
    if !object.kind().contains("identifier") {
        return None;
    }
    Some(node_text(object, source).to_string())
}

/// Name of the nearest enclosing named scope, empty at top level.
///
/// Climbs ancestors looking for a `name` field that is not the node
/// itself; this works uniformly across the six grammars.
fn enclosing_container(node: Node, source: &str) -> String {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if let Some(name_node) = ancestor.child_by_field_name("name") {
            if name_node.byte_range() != node.byte_range() {
                let text = node_text(name_node, source);
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
        current = ancestor.parent();
    }
    String::new()
}

fn is_upper_case(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && !name.chars().any(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_case_detection() {
        assert!(is_upper_case("MAX_RETRIES"));
        assert!(is_upper_case("X2"));
        assert!(!is_upper_case("MaxRetries"));
        assert!(!is_upper_case("__all__"));
    }

    #[test]
    fn role_priority_orders_semantics() {
        assert!(role_priority("implements") > role_priority("inherit"));
        assert!(role_priority("inherit") > role_priority("annotation"));
        assert!(role_priority("annotation") > role_priority("call"));
        assert!(role_priority("call") > role_priority("write"));
        assert!(role_priority("write") > role_priority("import"));
        assert!(role_priority("import") > role_priority("type"));
        assert!(role_priority("type") > role_priority("read"));
        assert!(role_priority("read") > role_priority("unknown"));
    }

    #[test]
    fn go_import_name_is_last_segment() {
        assert_eq!(
            normalize_ref_name(Language::Go, "import", "\"net/http\""),
            "http"
        );
        assert_eq!(normalize_ref_name(Language::Go, "import", "\"fmt\""), "fmt");
        assert_eq!(
            normalize_ref_name(Language::Rust, "import", "HashMap"),
            "HashMap"
        );
    }

    #[test]
    fn same_position_keeps_highest_priority_ref() {
        let raw = vec![
            RawRef {
                name: "Widget".to_string(),
                role: "read",
                line: 4,
                col: 10,
                receiver: None,
                context: String::new(),
            },
            RawRef {
                name: "Widget".to_string(),
                role: "call",
                line: 4,
                col: 10,
                receiver: None,
                context: String::new(),
            },
        ];
        let refs = emit_references(Language::Go, raw, &HashSet::new());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, RefKind::Call);
    }

    #[test]
    fn refs_at_definition_positions_are_dropped() {
        let mut def_positions = HashSet::new();
        def_positions.insert((4, 10));

        let raw = vec![RawRef {
            name: "Widget".to_string(),
            role: "type",
            line: 4,
            col: 10,
            receiver: None,
            context: String::new(),
        }];
        let refs = emit_references(Language::Go, raw, &def_positions);
        assert!(refs.is_empty());
    }

    #[test]
    fn empty_candidate_extraction_on_broken_source_still_succeeds() {
        // Error-tolerant parsing: garbage yields an ERROR tree, not a failure.
        let result = extract_source(Language::Go, "]]]] not go at all ((((");
        assert!(result.is_ok());
    }
}
