//! `sextant definition` command implementation.

use std::path::Path;

use colored::Colorize;

use super::{display, Target};

/// Go-to-definition by name or position.
pub fn run(repo: &Path, target: &Target, json: bool) -> Result<(), sextant::Error> {
    let engine = super::open_read_only(repo)?;
    let nav = engine.navigator();

    let defs = match target {
        Target::Name(name, lang) => nav.definitions_by_name(name, None, *lang)?,
        Target::Position { file, line, col } => nav.definitions_by_position(file, *line, *col)?,
    };

    if json {
        return display::print_json(&defs);
    }

    if defs.is_empty() {
        println!("{}", "No definitions found".yellow());
        return Ok(());
    }
    display::print_definitions(&defs);
    Ok(())
}
