//! `sextant info` command implementation: project facts.

use std::path::Path;

use colored::Colorize;

use super::display;

/// Print the repository root, source roots, and database path.
pub fn run(repo: &Path, json: bool) -> Result<(), sextant::Error> {
    let engine = super::open_read_only(repo)?;
    let info = engine.project_info();

    if json {
        return display::print_json(&info);
    }

    println!("{}: {}", "Repository".cyan().bold(), info.repo_root.display());
    println!(
        "{}: {}",
        "Source roots".cyan().bold(),
        info.source_roots.join(", ")
    );
    println!("{}: {}", "Database".cyan().bold(), info.db_path.display());
    Ok(())
}
