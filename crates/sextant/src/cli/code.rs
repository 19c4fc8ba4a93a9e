//! `sextant code` command implementation: fetch doc-expanded code.

use std::path::Path;

use colored::Colorize;

use super::Target;

/// Fetch code blocks for a symbol's definitions, or context windows
/// around its usages.
pub fn run(
    repo: &Path,
    target: &Target,
    usages: bool,
    lines_around: u32,
) -> Result<(), sextant::Error> {
    let engine = super::open_read_only(repo)?;
    let nav = engine.navigator();

    let output = if usages {
        let found = match target {
            Target::Name(name, lang) => nav.usages_by_name(name, *lang)?,
            Target::Position { file, line, col } => nav.usages_by_position(file, *line, *col)?,
        };
        engine.fetch_usages(&found, lines_around)
    } else {
        let defs = match target {
            Target::Name(name, lang) => nav.definitions_by_name(name, None, *lang)?,
            Target::Position { file, line, col } => {
                nav.definitions_by_position(file, *line, *col)?
            }
        };
        engine.fetch_definitions(&defs)
    };

    if output.is_empty() {
        println!("{}", "Nothing to show".yellow());
        return Ok(());
    }
    print!("{output}");
    Ok(())
}
