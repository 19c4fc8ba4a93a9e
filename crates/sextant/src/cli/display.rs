//! Shared output formatting for query commands.
//!
//! Columns print 0-based, exactly as the engine stores them; formatters
//! that want editor-style 1-based columns add one at their own boundary.

use colored::Colorize;
use sextant::{Definition, ScoredUsage, Usage};

/// Print definitions one per line: `path:line:col kind name [container]`.
pub fn print_definitions(defs: &[Definition]) {
    for def in defs {
        let location = format!("{}:{}:{}", def.path, def.span.start_line, def.span.start_col);
        let container = if def.container_name.is_empty() {
            String::new()
        } else {
            format!(" ({})", def.container_name.dimmed())
        };
        println!(
            "{} {} {}{}",
            location.cyan(),
            def.kind.as_str().yellow(),
            def.name.bold(),
            container
        );
        if let Some(sig) = &def.signature {
            println!("    {}", sig.dimmed());
        }
    }
}

/// Print usages one per line with kind and classification flags.
pub fn print_usages(usages: &[Usage]) {
    for usage in usages {
        println!("{}", format_usage(usage));
    }
}

/// Print scored usages, score first.
pub fn print_scored(usages: &[ScoredUsage]) {
    for scored in usages {
        println!("{:>6.4}  {}", scored.score, format_usage(&scored.usage));
        if let Some(best) = &scored.best_definition {
            println!("        -> {}", best.dimmed());
        }
    }
}

fn format_usage(usage: &Usage) -> String {
    let location = format!(
        "{}:{}:{}",
        usage.path, usage.span.start_line, usage.span.start_col
    );
    let mut flags = Vec::new();
    if usage.is_external {
        flags.push("external");
    }
    if usage.is_builtin {
        flags.push("builtin");
    }
    if let Some(relation) = &usage.relation {
        flags.push(relation);
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    format!(
        "{} {} {}{}",
        location.cyan(),
        usage.kind.as_str().yellow(),
        usage.name,
        flags.dimmed()
    )
}

/// Serialize anything to pretty JSON for `--json` output.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), sextant::Error> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|e| sextant::Error::Internal(format!("serializing output: {e}")))?;
    println!("{raw}");
    Ok(())
}
