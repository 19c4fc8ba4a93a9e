//! `sextant refs` command implementation: refs in a file line range.

use std::path::Path;

use colored::Colorize;

use super::display;

/// List refs in an inclusive line range of one file.
pub fn run(
    repo: &Path,
    file: &str,
    start_line: u32,
    end_line: u32,
    lang: Option<&str>,
    json: bool,
) -> Result<(), sextant::Error> {
    let engine = super::open_read_only(repo)?;
    let nav = engine.navigator();

    let lang = match lang {
        Some(tag) => super::parse_lang(tag)?,
        None => nav.language_of(file)?,
    };

    let refs = nav.refs_in_file_range(file, start_line, end_line, lang)?;

    if json {
        return display::print_json(&refs);
    }
    if refs.is_empty() {
        println!("{}", "No refs in range".yellow());
        return Ok(());
    }
    display::print_usages(&refs);
    Ok(())
}
