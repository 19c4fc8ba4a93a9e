//! `sextant usages` command implementation.

use std::path::Path;

use colored::Colorize;

use super::{display, Target};

/// Find usages by name or position, optionally with dependency scores.
pub fn run(repo: &Path, target: &Target, scores: bool, json: bool) -> Result<(), sextant::Error> {
    let engine = super::open_read_only(repo)?;
    let nav = engine.navigator();

    let (name, bias, lang) = match target {
        Target::Name(name, lang) => (name.clone(), None, *lang),
        Target::Position { file, line, col } => {
            let rel = nav.normalize_path(file);
            let (name, lang) = nav.identifier_at(&rel, *line, *col)?;
            (name, Some(rel), lang)
        }
    };

    if scores {
        let scored = engine.usages_with_scores(&name, bias.as_deref(), lang)?;
        if json {
            return display::print_json(&scored);
        }
        if scored.is_empty() {
            println!("{}", "No usages found".yellow());
            return Ok(());
        }
        display::print_scored(&scored);
        return Ok(());
    }

    let usages = nav.usages_by_name(&name, lang)?;
    if json {
        return display::print_json(&usages);
    }
    if usages.is_empty() {
        println!("{}", "No usages found".yellow());
        return Ok(());
    }
    display::print_usages(&usages);
    Ok(())
}
