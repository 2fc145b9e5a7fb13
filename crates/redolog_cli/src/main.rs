//! redolog CLI
//!
//! Command-line tools for inspecting and maintaining redolog files.
//!
//! # Commands
//!
//! - `inspect` - Display log header and summary statistics
//! - `verify` - Verify record integrity
//! - `dump` - Dump records for debugging
//! - `reset` - Truncate a log back to header-only length

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// redolog command-line log tools.
#[derive(Parser)]
#[command(name = "redolog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display log header and summary statistics
    Inspect {
        /// Path to the log file
        path: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify record integrity
    Verify {
        /// Path to the log file
        path: PathBuf,
    },

    /// Dump records for debugging
    Dump {
        /// Path to the log file
        path: PathBuf,

        /// Maximum number of records to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only dump records with an LSN above this value
        #[arg(long, default_value = "0")]
        after_lsn: u64,
    },

    /// Truncate the log back to header-only length (destructive)
    Reset {
        /// Path to the log file
        path: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { path, format } => {
            commands::inspect::run(&path, &format)?;
        }
        Commands::Verify { path } => {
            commands::verify::run(&path)?;
        }
        Commands::Dump {
            path,
            limit,
            after_lsn,
        } => {
            commands::dump::run(&path, limit, after_lsn)?;
        }
        Commands::Reset { path, yes } => {
            commands::reset::run(&path, yes)?;
        }
        Commands::Version => {
            println!("redolog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("redolog core v{}", redolog_core::VERSION);
        }
    }

    Ok(())
}
