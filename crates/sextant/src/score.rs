//! Probabilistic dependency scoring of usages against candidate
//! definitions.
//!
//! For each (usage, candidate) pair a multiplicative weight starts at
//! `BOOST_UNIQUE_MIN / sqrt(N)` and runs through a data-driven feature
//! table; weights normalize to a probability distribution per usage. The
//! reported score is the probability mass on the primary definition when
//! one is given, otherwise the maximum mass. Scores round to four
//! decimals.
//!
//! Lexical-context features read the usage's source line on demand through
//! the shared [`SourceCache`].

use serde::{Deserialize, Serialize};

use crate::snippets::SourceCache;
use crate::types::{Definition, RefKind, SymbolKind, Usage};

/// Base weight factor applied before the feature table.
pub const BOOST_UNIQUE_MIN: f64 = 0.5;

/// Options for scoring and grouping.
#[derive(Debug, Clone, Copy)]
pub struct ScoreOptions {
    /// Maximum line gap between consecutive usages in one adjacency group.
    pub group_gap: u32,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self { group_gap: 3 }
    }
}

/// Score of one usage against the candidate set.
#[derive(Debug, Clone, Copy)]
pub struct UsageScore {
    /// Probability mass on the primary (or best) candidate, four decimals
    pub score: f64,
    /// Index of the argmax candidate, when any candidates exist
    pub best: Option<usize>,
}

/// A maximal run of same-file usages whose start lines sit within the
/// configured gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageGroup {
    /// File the group lives in
    pub path: String,
    /// First member's start line
    pub start_line: u32,
    /// Last member's start line
    pub end_line: u32,
    /// Maximum member score
    pub score: f64,
    /// Indices into the scored usage slice, ascending by line
    pub usages: Vec<usize>,
}

/// Context handed to each feature predicate.
struct PairContext<'a> {
    usage: &'a Usage,
    candidate: &'a Definition,
    line: Option<&'a str>,
}

/// One multiplicative feature: a named weight function over a pair.
struct Feature {
    #[allow(dead_code)]
    name: &'static str,
    weight: fn(&PairContext<'_>) -> f64,
}

/// The feature table. Order is irrelevant; weights multiply.
const FEATURES: &[Feature] = &[
    Feature {
        name: "same_file",
        weight: |ctx| {
            if ctx.usage.path == ctx.candidate.path {
                3.0
            } else {
                1.0
            }
        },
    },
    Feature {
        name: "same_dir",
        weight: |ctx| {
            if ctx.usage.path != ctx.candidate.path && ctx.usage.dir() == ctx.candidate.dir() {
                1.5
            } else {
                1.0
            }
        },
    },
    Feature {
        name: "container_match",
        weight: |ctx| {
            if !ctx.usage.context_container.is_empty()
                && ctx.usage.context_container == ctx.candidate.container_name
            {
                1.5
            } else {
                1.0
            }
        },
    },
    Feature {
        name: "lexical_context",
        weight: lexical_context_weight,
    },
    Feature {
        name: "ref_kind_match",
        weight: ref_kind_weight,
    },
];

/// Score every usage against the candidate set.
///
/// An empty candidate list scores every usage 0; a single candidate scores
/// 1.0. When `primary` is given and present among the candidates, the
/// reported score is its probability mass.
pub fn score_usages(
    cache: &mut SourceCache,
    usages: &[Usage],
    candidates: &[Definition],
    primary: Option<&Definition>,
) -> Vec<UsageScore> {
    if candidates.is_empty() {
        return usages
            .iter()
            .map(|_| UsageScore {
                score: 0.0,
                best: None,
            })
            .collect();
    }

    let primary_index = primary.and_then(|p| {
        candidates
            .iter()
            .position(|c| c.path == p.path && c.name == p.name && c.span.start_line == p.span.start_line)
    });

    #[allow(clippy::cast_precision_loss)]
    let base = BOOST_UNIQUE_MIN / (candidates.len() as f64).sqrt();

    usages
        .iter()
        .map(|usage| {
            let line = cache
                .line(&usage.path, usage.span.start_line)
                .map(str::to_string);

            let weights: Vec<f64> = candidates
                .iter()
                .map(|candidate| {
                    let ctx = PairContext {
                        usage,
                        candidate,
                        line: line.as_deref(),
                    };
                    FEATURES
                        .iter()
                        .fold(base, |weight, feature| weight * (feature.weight)(&ctx))
                })
                .collect();

            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                return UsageScore {
                    score: 0.0,
                    best: None,
                };
            }

            let mut best = 0;
            for (i, w) in weights.iter().enumerate() {
                if *w > weights[best] {
                    best = i;
                }
            }

            let mass = match primary_index {
                Some(p) => weights[p] / total,
                None => weights[best] / total,
            };

            UsageScore {
                score: round4(mass),
                best: Some(best),
            }
        })
        .collect()
}

/// Group scored usages by file adjacency.
///
/// Per file, usages sort by start line and coalesce while consecutive
/// lines stay within `gap`. Each group's score is its member maximum;
/// groups come back descending by score (ties break on path then line),
/// members ascending by line.
#[must_use]
pub fn group_adjacent(usages: &[Usage], scores: &[UsageScore], gap: u32) -> Vec<UsageGroup> {
    let mut order: Vec<usize> = (0..usages.len()).collect();
    order.sort_by(|&a, &b| {
        usages[a]
            .path
            .cmp(&usages[b].path)
            .then(usages[a].span.start_line.cmp(&usages[b].span.start_line))
    });

    let mut groups: Vec<UsageGroup> = Vec::new();

    for idx in order {
        let usage = &usages[idx];
        let score = scores.get(idx).map_or(0.0, |s| s.score);

        let extend = groups.last().is_some_and(|group| {
            group.path == usage.path
                && usage.span.start_line.saturating_sub(group.end_line) <= gap
        });

        if extend {
            let group = groups.last_mut().expect("just checked");
            group.end_line = usage.span.start_line;
            group.score = group.score.max(score);
            group.usages.push(idx);
        } else {
            groups.push(UsageGroup {
                path: usage.path.clone(),
                start_line: usage.span.start_line,
                end_line: usage.span.start_line,
                score,
                usages: vec![idx],
            });
        }
    }

    groups.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.start_line.cmp(&b.start_line))
    });
    groups
}

/// Inspect the immediate syntactic environment of the name on its source
/// line and boost or penalize by candidate kind.
fn lexical_context_weight(ctx: &PairContext<'_>) -> f64 {
    let Some(line) = ctx.line else { return 1.0 };
    let Some((before, after)) = split_at_name(line, &ctx.usage.name, ctx.usage.span.start_col)
    else {
        return 1.0;
    };

    let kind = ctx.candidate.kind;
    let before_trim = before.trim_end();

    if ends_with_word(before_trim, "new")
        || ends_with_word(before_trim, "extends")
        || ends_with_word(before_trim, "implements")
    {
        return if kind.is_type_like() { 2.0 } else { 0.7 };
    }
    if before.ends_with('.') {
        return if kind.is_member_like() { 2.0 } else { 0.7 };
    }
    if after.starts_with('(') {
        return if kind.is_callable() { 2.0 } else { 0.7 };
    }
    if before_trim.ends_with(':') || before_trim.ends_with("->") {
        return if kind.is_type_like() { 1.5 } else { 1.0 };
    }

    1.0
}

/// Agreement between the usage's ref kind and the candidate's symbol kind.
fn ref_kind_weight(ctx: &PairContext<'_>) -> f64 {
    let kind = ctx.candidate.kind;
    match ctx.usage.kind {
        RefKind::Import => {
            if matches!(
                kind,
                SymbolKind::Module
                    | SymbolKind::Package
                    | SymbolKind::Class
                    | SymbolKind::Interface
                    | SymbolKind::Struct
                    | SymbolKind::Enum
                    | SymbolKind::Function
                    | SymbolKind::Constant
                    | SymbolKind::TypeAlias
                    | SymbolKind::Trait
            ) {
                3.0
            } else {
                0.6
            }
        }
        RefKind::TypeRef | RefKind::Inherit => {
            if kind.is_type_like() {
                2.5
            } else {
                0.5
            }
        }
        RefKind::Call => {
            if kind.is_callable() {
                2.5
            } else {
                0.6
            }
        }
        RefKind::Annotation => {
            if matches!(
                kind,
                SymbolKind::Class | SymbolKind::Interface | SymbolKind::Function
            ) {
                1.2
            } else {
                0.6
            }
        }
        RefKind::Read | RefKind::Write | RefKind::Other => 1.0,
    }
}

/// Locate the name on the line, preferring the recorded column, and split
/// the line around it.
fn split_at_name<'a>(line: &'a str, name: &str, col: u32) -> Option<(&'a str, &'a str)> {
    let col = col as usize;
    let pos = if line.get(col..).is_some_and(|rest| rest.starts_with(name)) {
        col
    } else {
        line.find(name)?
    };
    Some((&line[..pos], &line[pos + name.len()..]))
}

/// Whether `s` ends with `word` at a word boundary.
fn ends_with_word(s: &str, word: &str) -> bool {
    s.strip_suffix(word).is_some_and(|rest| {
        rest.chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_')
    })
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
