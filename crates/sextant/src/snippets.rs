//! Code windowing: reading and merging line ranges for presentation.
//!
//! Definitions are expanded backward over their doc lines before reading;
//! usage windows are clamped to file bounds and merged when they overlap
//! or touch. Output is bounded by a hard character budget with a visible
//! truncation marker.

use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

use crate::languages::spans;
use crate::types::{Definition, Usage};

/// Hard output budget for fetched code, in characters.
pub const MAX_FETCH_CHARS: usize = 100_000;

/// Marker appended when the budget cuts output short.
pub const TRUNCATION_MARKER: &str = "... [truncated: output budget exceeded]";

/// Per-file line cache for one fetch call.
///
/// Reads each file at most once; missing or unreadable files cache as
/// absent so repeated lookups stay cheap.
pub struct SourceCache {
    repo_root: PathBuf,
    files: HashMap<String, Option<Vec<String>>>,
}

impl SourceCache {
    /// Create a cache rooted at the repository.
    #[must_use]
    pub fn new(repo_root: &Path) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            files: HashMap::new(),
        }
    }

    /// The cached line array for a repo-relative path.
    pub fn lines(&mut self, rel_path: &str) -> Option<&[String]> {
        let repo_root = self.repo_root.clone();
        self.files
            .entry(rel_path.to_string())
            .or_insert_with(|| {
                let abs = safe_join_path(&repo_root, rel_path)?;
                let content = std::fs::read_to_string(abs).ok()?;
                Some(content.lines().map(str::to_string).collect())
            })
            .as_deref()
    }

    /// One 1-based line, when the file and line exist.
    pub fn line(&mut self, rel_path: &str, line: u32) -> Option<&str> {
        self.lines(rel_path)?
            .get(line.saturating_sub(1) as usize)
            .map(String::as_str)
    }
}

/// Join a repo-relative path onto the root, rejecting absolute inputs and
/// `..` escapes. Returns `None` for unsafe inputs.
#[must_use]
pub fn safe_join_path(repo_root: &Path, rel_path: &str) -> Option<PathBuf> {
    let rel = Path::new(rel_path);
    if rel.is_absolute() || rel_path.is_empty() {
        return None;
    }

    let mut clean = PathBuf::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            // A `..` that escapes the root, or any prefix/root component,
            // is unsafe.
            Component::ParentDir => {
                if !clean.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if clean.as_os_str().is_empty() {
        return None;
    }
    Some(repo_root.join(clean))
}

/// Merge sorted-or-not line windows: overlapping or adjacent ranges
/// coalesce, so the result has a gap of at least 2 between any pair.
#[must_use]
pub fn merge_windows(windows: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut sorted: Vec<(u32, u32)> = windows.to_vec();
    sorted.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(sorted.len());
    for (start, end) in sorted {
        match merged.last_mut() {
            Some((_, last_end)) if start <= last_end.saturating_add(1) => {
                *last_end = (*last_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Fetch the code of each definition, expanded backward over contiguous
/// doc lines, as labeled blocks.
pub fn fetch_definitions_code(cache: &mut SourceCache, defs: &[Definition]) -> String {
    let mut out = String::new();

    for def in defs {
        let Some(lines) = cache.lines(&def.path) else {
            continue;
        };
        let start = spans::doc_start(def.lang, lines, def.span.start_line);
        let end = def.span.end_line.min(lines.len() as u32);

        let mut block = format!("{}:{}-{}\n", def.path, start, end);
        for line in lines
            .iter()
            .take(end as usize)
            .skip(start.saturating_sub(1) as usize)
        {
            block.push_str(line);
            block.push('\n');
        }

        if out.len() + block.len() > MAX_FETCH_CHARS {
            out.push_str(TRUNCATION_MARKER);
            out.push('\n');
            break;
        }
        out.push_str(&block);
        out.push('\n');
    }

    out
}

/// Fetch context windows around usages, `lines_around` lines on each side,
/// merged per file.
pub fn fetch_usages_code(cache: &mut SourceCache, usages: &[Usage], lines_around: u32) -> String {
    // Group by file, preserving first-appearance order.
    let mut order: Vec<&str> = Vec::new();
    let mut by_file: HashMap<&str, Vec<(u32, u32)>> = HashMap::new();
    for usage in usages {
        let windows = by_file.entry(usage.path.as_str()).or_insert_with(|| {
            order.push(usage.path.as_str());
            Vec::new()
        });
        windows.push((
            usage.span.start_line.saturating_sub(lines_around).max(1),
            usage.span.end_line.saturating_add(lines_around),
        ));
    }

    let mut out = String::new();

    'files: for path in order {
        let Some(lines) = cache.lines(path) else {
            continue;
        };
        #[allow(clippy::cast_possible_truncation)]
        let line_count = lines.len() as u32;

        for (start, end) in merge_windows(&by_file[path]) {
            let end = end.min(line_count);
            if start > end {
                continue;
            }

            let mut block = format!("{path}:{start}-{end}\n");
            for (offset, line) in lines[(start - 1) as usize..end as usize].iter().enumerate() {
                let _ = writeln!(block, "{:>5} | {}", start as usize + offset, line);
            }

            if out.len() + block.len() > MAX_FETCH_CHARS {
                out.push_str(TRUNCATION_MARKER);
                out.push('\n');
                break 'files;
            }
            out.push_str(&block);
            out.push('\n');
        }
    }

    out
}
