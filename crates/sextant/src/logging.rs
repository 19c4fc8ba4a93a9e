//! Logging setup for the engine.
//!
//! Two modes:
//!
//! - **Terminal** ([`init_terminal`]): env-filtered output to stderr for CLI
//!   use. `RUST_LOG` overrides the verbosity flag.
//! - **File** ([`init_file`]): all log output redirected to a truncated
//!   per-run log file inside the state directory. Used whenever the engine
//!   runs under a transport that owns stdout/stderr, so stray bytes never
//!   pollute the protocol stream.

use std::path::Path;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Name of the run log inside the state directory.
pub const LOG_FILE: &str = "sextant.log";

static INIT: Once = Once::new();

/// Map a repeated `-v` count to a default filter directive.
fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize stderr logging for interactive use.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_terminal(verbose: u8) {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(filter_for(verbose))),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    });
}

/// Initialize file logging, truncating any previous run's log.
///
/// # Errors
///
/// Returns an I/O error when the log file cannot be created.
pub fn init_file(state_dir: &Path, verbose: u8) -> Result<()> {
    std::fs::create_dir_all(state_dir)?;
    let file = std::sync::Arc::new(std::fs::File::create(state_dir.join(LOG_FILE))?);

    INIT.call_once(move || {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(filter_for(verbose))),
            )
            .with_target(false)
            .with_ansi(false)
            .with_writer(file)
            .init();
    });

    Ok(())
}
