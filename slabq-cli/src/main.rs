//! slabq - command-line tool for slabq topics.
//!
//! A demonstration caller around the `slabq-log` engine: append payloads,
//! tail a topic, inspect status, and verify or repair segments.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slabq")]
#[command(about = "Local disk-backed append-only log")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append payloads to a topic (stdin lines when none are given)
    Append {
        /// Topic directory
        topic: PathBuf,

        /// Payloads to append
        payloads: Vec<String>,

        /// Segment rollover size hint in bytes
        #[arg(long, default_value_t = slabq_log::DEFAULT_SLAB_SIZE)]
        slab_size: u64,

        /// fsync the segment after the batch
        #[arg(long)]
        sync: bool,
    },

    /// Print records from a topic, one per line
    Cat {
        /// Topic directory
        topic: PathBuf,

        /// Starting absolute address
        #[arg(long, default_value_t = 0)]
        from: u64,

        /// Keep polling at end of log instead of exiting
        #[arg(short, long)]
        follow: bool,

        /// Poll interval in milliseconds when following
        #[arg(long, default_value_t = 200)]
        poll_ms: u64,
    },

    /// Print topic status as JSON
    Status {
        /// Topic directory
        topic: PathBuf,
    },

    /// Scan a topic for corruption and partial writes
    Verify {
        /// Topic directory
        topic: PathBuf,
    },

    /// Scan a topic and truncate a trailing partial record
    Repair {
        /// Topic directory
        topic: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Append {
            topic,
            payloads,
            slab_size,
            sync,
        } => commands::append(&topic, &payloads, slab_size, sync),
        Commands::Cat {
            topic,
            from,
            follow,
            poll_ms,
        } => commands::cat(&topic, from, follow, poll_ms),
        Commands::Status { topic } => commands::status(&topic),
        Commands::Verify { topic } => commands::verify(&topic, false),
        Commands::Repair { topic } => commands::verify(&topic, true),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red(), e);
        std::process::exit(1);
    }
}
