//! runnerd CLI entry point.

use anyhow::Result;
use clap::Parser;

use runnerd::cli::commands::{auth, balance, migrate, runner, server, stake};
use runnerd::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Auth { private_key, config } => {
            auth::handle_auth(private_key, config, cli.json).await
        }
        Commands::Stake { amount, config } => stake::handle_stake(amount, config, cli.json).await,
        Commands::Balance { config } => balance::handle_balance(config, cli.json).await,
        Commands::Server { config } => server::handle_server(config, cli.json).await,
        Commands::Runner { config } => runner::handle_runner(config, cli.json).await,
        Commands::Migrate { down, config } => migrate::handle_migrate(down, config, cli.json).await,
    }
}
