//! Sextant CLI - code intelligence from the command line.
//!
//! Indexes a repository with tree-sitter, stores symbols and references in
//! `SQLite`, and answers definition, usage, and dependency-graph queries.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use sextant::graph::GraphOptions;

mod cli;

/// Sextant: local code-intelligence engine.
#[derive(Parser)]
#[command(name = "sextant")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(short, long, global = true)]
    repo: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Redirect all log output to `.sextant/sextant.log` (truncated per
    /// run). Keeps stdout/stderr clean when driven by a transport.
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from scratch
    Index,

    /// Incrementally reconcile the index with the filesystem
    Reconcile,

    /// Watch source roots and keep the index reconciled
    Watch,

    /// Go-to-definition by name or position
    Definition {
        /// Symbol name (alternative to --file/--line/--col)
        name: Option<String>,

        /// Language tag for name queries (go, java, rust, python, typescript, javascript)
        #[arg(short, long)]
        lang: Option<String>,

        /// File path for position queries
        #[arg(short, long)]
        file: Option<String>,

        /// 1-based line for position queries
        #[arg(long)]
        line: Option<u32>,

        /// 0-based column for position queries
        #[arg(long)]
        col: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find usages by name or position
    Usages {
        /// Symbol name (alternative to --file/--line/--col)
        name: Option<String>,

        /// Language tag for name queries
        #[arg(short, long)]
        lang: Option<String>,

        /// File path for position queries
        #[arg(short, long)]
        file: Option<String>,

        /// 1-based line for position queries
        #[arg(long)]
        line: Option<u32>,

        /// 0-based column for position queries
        #[arg(long)]
        col: Option<u32>,

        /// Attach dependency scores (adjacency-group order)
        #[arg(short, long)]
        scores: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dependency graph around a symbol
    Graph {
        /// Symbol name (alternative to --file/--line/--col)
        name: Option<String>,

        /// Language tag for name queries
        #[arg(short, long)]
        lang: Option<String>,

        /// File path for position queries
        #[arg(short, long)]
        file: Option<String>,

        /// 1-based line for position queries
        #[arg(long)]
        line: Option<u32>,

        /// 0-based column for position queries
        #[arg(long)]
        col: Option<u32>,

        /// Outbound expansion depth (0 = inbound only)
        #[arg(long, default_value = "1")]
        max_depth: u32,

        /// Drop usages scoring below this
        #[arg(long, default_value = "0.0")]
        min_score: f64,

        /// Cap on usages fetched for inbound analysis
        #[arg(long, default_value = "500")]
        max_usages: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refs within an inclusive line range of one file
    Refs {
        /// File path
        #[arg(short, long)]
        file: String,

        /// Range start (1-based, inclusive)
        #[arg(long)]
        start: u32,

        /// Range end (1-based, inclusive)
        #[arg(long)]
        end: u32,

        /// Language tag (defaults to the indexed file's language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch doc-expanded code for definitions, or windows around usages
    Code {
        /// Symbol name (alternative to --file/--line/--col)
        name: Option<String>,

        /// Language tag for name queries
        #[arg(short, long)]
        lang: Option<String>,

        /// File path for position queries
        #[arg(short, long)]
        file: Option<String>,

        /// 1-based line for position queries
        #[arg(long)]
        line: Option<u32>,

        /// 0-based column for position queries
        #[arg(long)]
        col: Option<u32>,

        /// Fetch usage windows instead of definition bodies
        #[arg(short, long)]
        usages: bool,

        /// Context lines on each side of a usage window
        #[arg(long, default_value = "3")]
        around: u32,
    },

    /// Show index statistics
    Stats,

    /// Show project info (root, source roots, database path)
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let repo = match args.repo {
        Some(repo) => repo,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };

    if args.log_file {
        let state_dir = sextant::ProjectConfig::state_dir(&repo);
        if let Err(e) = sextant::logging::init_file(&state_dir, args.verbose) {
            eprintln!("{}: failed to open log file: {e}", "error".red().bold());
            return ExitCode::FAILURE;
        }
    } else {
        sextant::logging::init_terminal(args.verbose);
    }

    let result = match args.command {
        Commands::Index => cli::index::run(&repo),
        Commands::Reconcile => cli::reconcile::run(&repo),
        Commands::Watch => cli::watch::run(&repo),
        Commands::Definition {
            name,
            lang,
            file,
            line,
            col,
            json,
        } => cli::resolve_target(name.as_deref(), lang.as_deref(), file.as_deref(), line, col)
            .and_then(|target| cli::definition::run(&repo, &target, json)),
        Commands::Usages {
            name,
            lang,
            file,
            line,
            col,
            scores,
            json,
        } => cli::resolve_target(name.as_deref(), lang.as_deref(), file.as_deref(), line, col)
            .and_then(|target| cli::usages::run(&repo, &target, scores, json)),
        Commands::Graph {
            name,
            lang,
            file,
            line,
            col,
            max_depth,
            min_score,
            max_usages,
            json,
        } => cli::resolve_target(name.as_deref(), lang.as_deref(), file.as_deref(), line, col)
            .and_then(|target| {
                let options = GraphOptions {
                    max_depth,
                    min_score,
                    max_usages,
                };
                cli::graph::run(&repo, &target, &options, json)
            }),
        Commands::Refs {
            file,
            start,
            end,
            lang,
            json,
        } => cli::refs::run(&repo, &file, start, end, lang.as_deref(), json),
        Commands::Code {
            name,
            lang,
            file,
            line,
            col,
            usages,
            around,
        } => cli::resolve_target(name.as_deref(), lang.as_deref(), file.as_deref(), line, col)
            .and_then(|target| cli::code::run(&repo, &target, usages, around)),
        Commands::Stats => cli::stats::run(&repo),
        Commands::Info { json } => cli::info::run(&repo, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
