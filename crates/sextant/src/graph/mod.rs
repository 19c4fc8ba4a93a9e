//! Dependency graph construction around a primary definition.
//!
//! Inbound edges aggregate scored usages per referring file; outbound
//! edges follow the refs inside the primary's span to their best candidate
//! definitions. Symbol edges collapse into a deterministic file graph.

mod types;

pub use types::{DependencyGraph, EdgeDirection, FileEdge, GraphOptions, SymbolEdge, SymbolNode};

use std::collections::HashMap;

use crate::error::Result;
use crate::navigate::Navigator;
use crate::score::{group_adjacent, score_usages, ScoreOptions};
use crate::snippets::SourceCache;
use crate::types::{Definition, ScoredUsage};

/// Build the dependency graph for a primary definition and its candidate
/// set.
pub fn build(
    nav: &Navigator<'_>,
    cache: &mut SourceCache,
    primary: &Definition,
    candidates: &[Definition],
    options: &GraphOptions,
) -> Result<DependencyGraph> {
    let mut nodes = vec![SymbolNode::from_definition(primary)];
    let mut edges: Vec<SymbolEdge> = Vec::new();

    let usages = inbound(nav, cache, primary, candidates, options, &mut edges)?;

    if options.max_depth >= 1 {
        outbound(nav, primary, &mut nodes, &mut edges)?;
    }

    let file_graph = collapse_to_files(primary, &edges);

    Ok(DependencyGraph {
        primary: primary.clone(),
        candidates: candidates.to_vec(),
        nodes,
        edges,
        file_graph,
        usages,
    })
}

/// Score all usages of the primary's name, group them, filter by
/// `min_score`, and aggregate one inbound edge per referring file.
fn inbound(
    nav: &Navigator<'_>,
    cache: &mut SourceCache,
    primary: &Definition,
    candidates: &[Definition],
    options: &GraphOptions,
    edges: &mut Vec<SymbolEdge>,
) -> Result<Vec<ScoredUsage>> {
    let mut usages = nav.usages_by_name(&primary.name, primary.lang)?;
    if usages.len() > options.max_usages {
        usages.truncate(options.max_usages);
    }

    let scores = score_usages(cache, &usages, candidates, Some(primary));
    let groups = group_adjacent(&usages, &scores, ScoreOptions::default().group_gap);

    // Per referring file: ref count and max score, over the filtered set.
    let mut per_file: HashMap<&str, (usize, f64)> = HashMap::new();
    let mut ordered: Vec<ScoredUsage> = Vec::new();

    for group in &groups {
        for &idx in &group.usages {
            let usage = &usages[idx];
            let score = scores[idx].score;
            if score < options.min_score {
                continue;
            }

            let entry = per_file.entry(usage.path.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 = entry.1.max(score);

            ordered.push(ScoredUsage {
                usage: usage.clone(),
                score,
                best_definition: scores[idx].best.map(|b| candidates[b].node_id()),
            });
        }
    }

    let primary_id = primary.node_id();
    let mut inbound_edges: Vec<SymbolEdge> = per_file
        .into_iter()
        .map(|(path, (count, score))| SymbolEdge {
            from: path.to_string(),
            to: primary_id.clone(),
            direction: EdgeDirection::Inbound,
            count,
            score,
        })
        .collect();
    inbound_edges.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.from.cmp(&b.from))
    });
    edges.extend(inbound_edges);

    Ok(ordered)
}

/// Follow refs inside the primary's span to their best candidate
/// definitions and emit one outbound edge per distinct referenced name.
fn outbound(
    nav: &Navigator<'_>,
    primary: &Definition,
    nodes: &mut Vec<SymbolNode>,
    edges: &mut Vec<SymbolEdge>,
) -> Result<()> {
    let refs = nav.refs_in_file_range(
        &primary.path,
        primary.span.start_line,
        primary.span.end_line,
        primary.lang,
    )?;

    // Dedup by name, counting occurrences, preserving first-seen order.
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in &refs {
        if r.name == primary.name {
            continue;
        }
        match counts.entry(r.name.as_str()) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                order.push(r.name.as_str());
                slot.insert(1);
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => *slot.get_mut() += 1,
        }
    }

    let primary_id = primary.node_id();

    for name in order {
        let targets = nav.definitions_by_name(name, Some(&primary.path), primary.lang)?;
        if targets.is_empty() {
            continue;
        }
        let best = best_candidate(primary, &targets);

        #[allow(clippy::cast_precision_loss)]
        let score = 1.0 / (targets.len() as f64).sqrt();

        nodes.push(SymbolNode::from_definition(best));
        edges.push(SymbolEdge {
            from: primary_id.clone(),
            to: best.node_id(),
            direction: EdgeDirection::Outbound,
            count: counts[name],
            score: (score * 10_000.0).round() / 10_000.0,
        });
    }

    Ok(())
}

/// Simple outbound tie-break: same file beats same directory beats the
/// first (kind-ranked) candidate.
fn best_candidate<'a>(primary: &Definition, targets: &'a [Definition]) -> &'a Definition {
    targets
        .iter()
        .find(|t| t.path == primary.path)
        .or_else(|| targets.iter().find(|t| t.dir() == primary.dir()))
        .unwrap_or(&targets[0])
}

/// Collapse symbol edges to `(from_file, to_file)` aggregates: self-loops
/// drop, counts sum, scores max. Deterministic order: score descending,
/// then from, then to.
fn collapse_to_files(primary: &Definition, edges: &[SymbolEdge]) -> Vec<FileEdge> {
    let mut aggregated: HashMap<(String, String), (usize, f64)> = HashMap::new();

    for edge in edges {
        let (from_file, to_file) = match edge.direction {
            EdgeDirection::Inbound => (edge.from.clone(), primary.path.clone()),
            EdgeDirection::Outbound => {
                let target_file = edge.to.split(':').next().unwrap_or("").to_string();
                (primary.path.clone(), target_file)
            }
        };
        if from_file == to_file || from_file.is_empty() || to_file.is_empty() {
            continue;
        }

        let entry = aggregated.entry((from_file, to_file)).or_insert((0, 0.0));
        entry.0 += edge.count;
        entry.1 = entry.1.max(edge.score);
    }

    let mut file_edges: Vec<FileEdge> = aggregated
        .into_iter()
        .map(|((from, to), (count, score))| FileEdge {
            from,
            to,
            count,
            score,
        })
        .collect();

    file_edges.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
    });
    file_edges
}
