//! merklelog CLI - verify events, event lists and seals against a tenant's log.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{completeness, consistency, hash, inclusion, seal};
use config::StorageArgs;

#[derive(Parser)]
#[command(name = "merklelog")]
#[command(about = "Verify events against a merklelog")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    storage: StorageArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that one event is included in the log
    Inclusion {
        /// Event JSON file (or stdin if not provided)
        event: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify every event of a list and report log entries it omits
    Completeness {
        /// Events API response file (or stdin if not provided)
        events: Option<String>,
        /// Exit with error code if the list omits any entry
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify the seal of a massif
    Seal {
        /// Massif whose seal is checked
        #[arg(long)]
        massif_index: u32,
        /// PEM public key of the log
        #[arg(long, env = "MERKLELOG_KEY")]
        key: PathBuf,
        /// Write the verified seal, root included, to FILE
        #[arg(long)]
        save: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify that the log extends a previously saved seal
    Consistency {
        /// Seal saved with `seal --save`
        #[arg(long)]
        prior: PathBuf,
        /// Massif whose seal is the current state
        #[arg(long)]
        massif_index: u32,
        /// PEM public key of the log
        #[arg(long, env = "MERKLELOG_KEY")]
        key: PathBuf,
    },
    /// Show the leaf hash of an event
    Hash {
        /// Event JSON file (or stdin if not provided)
        event: Option<String>,
        /// Also print the canonical bytes
        #[arg(long)]
        canonical: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Inclusion { event, json } => inclusion::run(&cli.storage, event, json),
        Commands::Completeness {
            events,
            strict,
            json,
        } => completeness::run(&cli.storage, events, strict, json),
        Commands::Seal {
            massif_index,
            key,
            save,
            json,
        } => seal::run(&cli.storage, massif_index, key, save, json),
        Commands::Consistency {
            prior,
            massif_index,
            key,
        } => consistency::run(&cli.storage, prior, massif_index, key),
        Commands::Hash { event, canonical } => hash::run(event, canonical),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
