//! beaconlink CLI - terminal access to LAN peer discovery.
//!
//! Listens for peer beacons, announces this host, and upgrades discovered
//! peers to stream connections, for scripting and headless operation.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use error::exit_codes;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<(), error::CliError> {
    match cli.command {
        Commands::Discover(args) => commands::run_discover(args, cli.json).await,
        Commands::Connect(args) => commands::run_connect(args, cli.json).await,
        Commands::Announce(args) => commands::run_announce(args).await,
    }
}
