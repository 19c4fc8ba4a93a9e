//! `sextant reconcile` command implementation.

use std::path::Path;

use colored::Colorize;

/// Run an incremental reconcile against the filesystem.
pub fn run(repo: &Path) -> Result<(), sextant::Error> {
    println!("{} {}...", "Reconciling".cyan().bold(), repo.display());

    let mut engine = super::open_writable(repo)?;
    let stats = engine.reconcile()?;

    println!();
    println!(
        "{} {} indexed, {} skipped (unchanged), {} deleted",
        "Reconciled".green().bold(),
        stats.indexed,
        stats.skipped,
        stats.deleted
    );
    println!("{}: {:.2?}", "Duration".dimmed(), stats.duration);

    super::index::print_errors(&stats.errors);
    Ok(())
}
