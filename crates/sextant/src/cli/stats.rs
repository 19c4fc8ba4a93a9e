//! `sextant stats` command implementation.

use std::path::Path;

use colored::Colorize;

/// Print aggregate index statistics.
pub fn run(repo: &Path) -> Result<(), sextant::Error> {
    let engine = super::open_read_only(repo)?;
    let stats = engine.stats()?;

    println!("{}", "Index statistics".cyan().bold());
    println!("  files:   {}", stats.file_count);
    println!("  symbols: {}", stats.symbol_count);
    println!("  refs:    {}", stats.ref_count);

    if !stats.files_by_language.is_empty() {
        println!();
        println!("{}:", "By language".green().bold());
        let mut entries: Vec<_> = stats.files_by_language.iter().collect();
        entries.sort_by_key(|(lang, _)| lang.as_str());
        for (lang, count) in entries {
            println!("  {:<12} {}", lang.as_str(), count);
        }
    }

    Ok(())
}
