//! `sextant watch` command implementation.

use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;

/// Reconcile once, then watch the source roots for changes.
///
/// The watch stops when stdin closes: the supervising process (or the
/// terminal) signals shutdown by ending our input, and the loop flushes
/// its pending set before returning.
pub fn run(repo: &Path) -> Result<(), sextant::Error> {
    let mut engine = super::open_writable(repo)?;

    // Catch up with whatever changed since the last run before watching.
    let stats = engine.reconcile()?;
    println!(
        "{} {} indexed, {} skipped, {} deleted",
        "Reconciled".green().bold(),
        stats.indexed,
        stats.skipped,
        stats.deleted
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut sink = [0u8; 64];
            let mut stdin = std::io::stdin();
            loop {
                match stdin.read(&mut sink) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            stop.store(true, Ordering::Relaxed);
        });
    }

    println!("{} (close stdin to stop)", "Watching".cyan().bold());
    engine.watch(&stop)
}
