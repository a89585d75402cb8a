//! KLS CLI
//!
//! Command-line driver for the KLS key/list store.
//!
//! # Commands
//!
//! - `exec` - Run insert/search/delete commands against a fresh store
//! - `stress` - Run the stress suite and print throughput
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use kls_core::{Config, HashAlgorithm, DEFAULT_BUCKET_COUNT, DEFAULT_MAX_ENTRY_SIZE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// KLS key/list store tools.
#[derive(Parser)]
#[command(name = "kls")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Exclusive upper bound on key and value length
    #[arg(global = true, long, default_value_t = DEFAULT_MAX_ENTRY_SIZE)]
    max_entry_size: usize,

    /// Number of hash buckets
    #[arg(global = true, long, default_value_t = DEFAULT_BUCKET_COUNT)]
    buckets: usize,

    /// Bucket hash (byte-sum, xxh3)
    #[arg(global = true, long, default_value = "byte-sum")]
    hash: HashAlgorithm,

    /// Maximum number of live keys
    #[arg(global = true, long)]
    max_keys: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run line commands against a fresh store
    ///
    /// Each line is `insert <key> <value>`, `search <key> <index>` or
    /// `delete <key>`. Arguments prefixed with `hex:` are hex-decoded.
    Exec {
        /// Read commands from this file instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run the stress suite
    Stress {
        /// Number of worker threads
        #[arg(short, long, default_value = "4")]
        threads: usize,

        /// Operations per test
        #[arg(short, long, default_value = "10000")]
        operations: usize,

        /// Number of distinct keys
        #[arg(short, long, default_value = "1000")]
        keys: usize,

        /// Value size in bytes
        #[arg(long, default_value = "64")]
        value_size: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

impl Cli {
    fn store_config(&self) -> Config {
        Config::new()
            .max_entry_size(self.max_entry_size)
            .bucket_count(self.buckets)
            .hash_algorithm(self.hash)
            .max_keys(self.max_keys)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.store_config();

    match cli.command {
        Commands::Exec { script, format } => {
            commands::exec::run(config, script.as_deref(), &format)?;
        }
        Commands::Stress {
            threads,
            operations,
            keys,
            value_size,
            format,
        } => {
            let stress = kls_testkit::StressConfig {
                operations,
                threads,
                value_size,
                key_count: keys,
            };
            commands::stress::run(config, &stress, &format)?;
        }
        Commands::Version => {
            println!("KLS CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("KLS Core v{}", kls_core::VERSION);
        }
    }

    Ok(())
}
