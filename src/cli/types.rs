//! CLI type definitions: the six subcommands named in spec.md §6.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "runnerd")]
#[command(about = "Reward-backed distributed task coordinator and runner agent", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a signing key (from RUNNERD_PRIVATE_KEY or an interactive prompt) and persist it to the keystore
    Auth {
        /// Private key hex to store instead of prompting (mainly for scripting/tests)
        #[arg(long)]
        private_key: Option<String>,

        /// Path to the YAML config file (chain RPC settings)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Submit an on-chain stake transaction for the loaded key
    Stake {
        /// Amount to stake, in whole tokens
        amount: f64,

        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Read-only stake/balance query for the loaded key
    Balance {
        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Start the dispatcher (Task Service + HTTP + Push Fan-Out + Liveness Monitor)
    Server {
        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Start the Runner Agent
    Runner {
        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Apply (or, with --down, revert the most recent) database migrations and exit
    Migrate {
        /// Revert the most recently applied migration instead of applying pending ones
        #[arg(long)]
        down: bool,

        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
