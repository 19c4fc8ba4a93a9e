//! Block-end and doc-line derivation over raw source lines.
//!
//! Tree-sitter gives exact node extents, but two places still need textual
//! derivation: degenerate single-line parents during extraction, and doc
//! expansion when presenting definitions. Both work on plain line arrays so
//! they stay cheap and unit-testable.
//!
//! Lines are 1-based throughout, matching the rest of the engine.

use crate::types::Language;

/// End line of a brace-delimited block starting at `decl_line`.
///
/// Tracks `{` depth; once the first `{` has been seen, the line where depth
/// returns to zero ends the block. A line ending in `;` before any `{` ends
/// a single-statement declaration. Falls back to the declaration line.
pub fn brace_block_end<S: AsRef<str>>(lines: &[S], decl_line: u32) -> u32 {
    let start = decl_line.saturating_sub(1) as usize;
    if start >= lines.len() {
        return decl_line;
    }

    let mut depth: i32 = 0;
    let mut seen_brace = false;

    for (offset, line) in lines[start..].iter().enumerate() {
        let line = line.as_ref();
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    seen_brace = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let current = decl_line + offset as u32;

        if seen_brace {
            if depth <= 0 {
                return current;
            }
        } else if line.trim_end().ends_with(';') {
            return current;
        }
    }

    decl_line
}

/// End line of an indentation-delimited block starting at `decl_line`.
///
/// The last following line indented deeper than the declaration ends the
/// block; blank lines are skipped. Falls back to the declaration line.
pub fn indent_block_end<S: AsRef<str>>(lines: &[S], decl_line: u32) -> u32 {
    let start = decl_line.saturating_sub(1) as usize;
    if start >= lines.len() {
        return decl_line;
    }

    let decl_indent = leading_whitespace(lines[start].as_ref());
    let mut end = decl_line;

    for (offset, line) in lines[start + 1..].iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        if leading_whitespace(line) <= decl_indent {
            break;
        }
        #[allow(clippy::cast_possible_truncation)]
        {
            end = decl_line + 1 + offset as u32;
        }
    }

    end
}

/// Block end for a language: indentation for Python, braces otherwise.
pub fn block_end<S: AsRef<str>>(lang: Language, lines: &[S], decl_line: u32) -> u32 {
    if lang.uses_indent_blocks() {
        indent_block_end(lines, decl_line)
    } else {
        brace_block_end(lines, decl_line)
    }
}

/// Earliest contiguous doc line above `decl_line`, or `decl_line` itself.
///
/// Scans backward while lines are non-blank and match the language's
/// doc-line recognizer; a blank line terminates the scan.
pub fn doc_start<S: AsRef<str>>(lang: Language, lines: &[S], decl_line: u32) -> u32 {
    let mut start = decl_line;

    while start > 1 {
        let above = lines
            .get((start - 2) as usize)
            .map(AsRef::as_ref)
            .unwrap_or("");
        let trimmed = above.trim();
        if trimmed.is_empty() || !is_doc_line(lang, trimmed) {
            break;
        }
        start -= 1;
    }

    start
}

/// Whether a trimmed line reads as documentation, a decorator, or an
/// annotation for the given language.
pub fn is_doc_line(lang: Language, trimmed: &str) -> bool {
    match lang {
        Language::Go => {
            trimmed.starts_with("//")
                || trimmed.starts_with("/*")
                || trimmed.starts_with('*')
                || trimmed.ends_with("*/")
        }
        Language::Java => {
            trimmed.starts_with("//")
                || trimmed.starts_with("/*")
                || trimmed.starts_with('*')
                || trimmed.ends_with("*/")
                || trimmed.starts_with('@')
        }
        Language::Rust => {
            trimmed.starts_with("//") || trimmed.starts_with("#[") || trimmed.starts_with("#![")
        }
        Language::Python => trimmed.starts_with('#') || trimmed.starts_with('@'),
        Language::TypeScript | Language::JavaScript => {
            trimmed.starts_with("//")
                || trimmed.starts_with("/*")
                || trimmed.starts_with('*')
                || trimmed.ends_with("*/")
                || trimmed.starts_with('@')
        }
    }
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn brace_block_spans_struct_body() {
        let lines = ["type C struct {", "  H string", "  P int", "}"];
        assert_eq!(brace_block_end(&lines, 1), 4);
    }

    #[test]
    fn brace_block_handles_single_line() {
        let lines = ["func f() { return }", "func g() {}"];
        assert_eq!(brace_block_end(&lines, 1), 1);
        assert_eq!(brace_block_end(&lines, 2), 2);
    }

    #[test]
    fn brace_block_stops_at_semicolon_without_brace() {
        let lines = ["var x = compute(", "  1, 2,", ");", "func next() {}"];
        assert_eq!(brace_block_end(&lines, 1), 3);
    }

    #[test]
    fn brace_block_falls_back_to_decl_line() {
        let lines = ["type Alias = Other"];
        assert_eq!(brace_block_end(&lines, 1), 1);
        assert_eq!(brace_block_end(&lines, 9), 9);
    }

    #[test]
    fn indent_block_covers_nested_defs() {
        let lines = [
            "class Foo:",
            "    def bar(self):",
            "        print(1)",
            "    def baz(self): pass",
        ];
        assert_eq!(indent_block_end(&lines, 1), 4);
        assert_eq!(indent_block_end(&lines, 2), 3);
    }

    #[test]
    fn indent_block_skips_blank_lines() {
        let lines = ["def f():", "    a = 1", "", "    return a", "x = 2"];
        assert_eq!(indent_block_end(&lines, 1), 4);
    }

    #[test]
    fn indent_block_with_no_body_is_decl_line() {
        let lines = ["x = 1", "y = 2"];
        assert_eq!(indent_block_end(&lines, 1), 1);
    }

    #[test]
    fn doc_start_expands_over_comment_block() {
        let lines = [
            "",
            "// Foo holds state.",
            "type Foo struct {",
            "  A int",
            "}",
        ];
        assert_eq!(doc_start(Language::Go, &lines, 3), 2);
    }

    #[test]
    fn doc_start_stops_at_blank_line() {
        let lines = ["// stale comment", "", "// attached", "func f() {}"];
        assert_eq!(doc_start(Language::Go, &lines, 4), 3);
    }

    #[test]
    fn doc_start_without_docs_is_decl_line() {
        let lines = ["x := 1", "func f() {}"];
        assert_eq!(doc_start(Language::Go, &lines, 2), 2);
    }

    #[test]
    fn doc_start_includes_python_decorators() {
        let lines = ["# helper", "@cached", "def f():", "    pass"];
        assert_eq!(doc_start(Language::Python, &lines, 3), 1);
    }

    #[test]
    fn doc_start_includes_rust_attributes() {
        let lines = ["/// Doc.", "#[derive(Debug)]", "struct S;"];
        assert_eq!(doc_start(Language::Rust, &lines, 3), 1);
    }

    #[rstest]
    #[case(Language::Go, "// x", true)]
    #[case(Language::Go, "@Override", false)]
    #[case(Language::Java, "@Override", true)]
    #[case(Language::Java, "* middle of javadoc", true)]
    #[case(Language::Rust, "#![allow(dead_code)]", true)]
    #[case(Language::Rust, "@decorator", false)]
    #[case(Language::Python, "# note", true)]
    #[case(Language::Python, "// not python", false)]
    #[case(Language::TypeScript, "@Component()", true)]
    #[case(Language::JavaScript, "end of block */", true)]
    fn doc_line_recognizers(#[case] lang: Language, #[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_doc_line(lang, line), expected);
    }
}
