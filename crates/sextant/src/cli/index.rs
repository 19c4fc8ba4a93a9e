//! `sextant index` command implementation.

use std::path::Path;

use colored::Colorize;

/// Run a full index of the repository.
pub fn run(repo: &Path) -> Result<(), sextant::Error> {
    println!("{} {}...", "Indexing".cyan().bold(), repo.display());

    let mut engine = super::open_writable(repo)?;
    let stats = engine.index()?;

    println!();
    println!(
        "{} {} files, {} symbols, {} refs",
        "Indexed".green().bold(),
        stats.indexed,
        stats.symbols,
        stats.refs
    );
    println!("{}: {:.2?}", "Duration".dimmed(), stats.duration);

    print_errors(&stats.errors);
    Ok(())
}

/// Print up to five per-file errors, then a count of the rest.
pub(crate) fn print_errors(errors: &[sextant::IndexError]) {
    if errors.is_empty() {
        return;
    }
    println!();
    println!("{} ({}):", "Errors".red().bold(), errors.len());
    for err in errors.iter().take(5) {
        println!("  {} {}: {}", "•".red(), err.path.display(), err.message);
    }
    if errors.len() > 5 {
        println!("  ... and {} more", errors.len() - 5);
    }
}
