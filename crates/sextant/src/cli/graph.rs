//! `sextant graph` command implementation.

use std::path::Path;

use colored::Colorize;
use sextant::graph::GraphOptions;

use super::{display, Target};

/// Build and print the dependency graph around a symbol.
pub fn run(
    repo: &Path,
    target: &Target,
    options: &GraphOptions,
    json: bool,
) -> Result<(), sextant::Error> {
    let engine = super::open_read_only(repo)?;

    let graph = match target {
        Target::Name(name, lang) => engine.dependency_graph(name, None, *lang, options)?,
        Target::Position { file, line, col } => {
            engine.dependency_graph_at(file, *line, *col, options)?
        }
    };

    if json {
        return display::print_json(&graph);
    }

    println!(
        "{} {} ({}, {} candidate{})",
        "Primary".cyan().bold(),
        graph.primary.node_id(),
        graph.primary.kind,
        graph.candidates.len(),
        if graph.candidates.len() == 1 { "" } else { "s" }
    );

    let inbound: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.direction == sextant::graph::EdgeDirection::Inbound)
        .collect();
    if !inbound.is_empty() {
        println!();
        println!("{}:", "Inbound".green().bold());
        for edge in inbound {
            println!(
                "  {} {} ref{} (score {:.4})",
                edge.from.cyan(),
                edge.count,
                if edge.count == 1 { "" } else { "s" },
                edge.score
            );
        }
    }

    let outbound: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.direction == sextant::graph::EdgeDirection::Outbound)
        .collect();
    if !outbound.is_empty() {
        println!();
        println!("{}:", "Outbound".green().bold());
        for edge in outbound {
            println!(
                "  {} x{} (score {:.4})",
                edge.to.cyan(),
                edge.count,
                edge.score
            );
        }
    }

    if !graph.file_graph.is_empty() {
        println!();
        println!("{}:", "Files".green().bold());
        for edge in &graph.file_graph {
            println!(
                "  {} -> {} ({} ref{}, score {:.4})",
                edge.from,
                edge.to.cyan(),
                edge.count,
                if edge.count == 1 { "" } else { "s" },
                edge.score
            );
        }
    }

    Ok(())
}
