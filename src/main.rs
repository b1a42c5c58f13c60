//! fuel-log - Fuel log client
//!
//! Log in to the fleet backend, list vehicles and record fuel purchases from
//! the terminal.
//!
//! Available as the `fuellog` command.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fuel_log::cli::commands::{Cli, Commands};
use fuel_log::cli::{auth, config, log, vehicle};
use fuel_log::error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Auth(args) => auth::handle_auth(args.command).await,
        Commands::Vehicle(args) => vehicle::handle_vehicle(args.command).await,
        Commands::Log(args) => log::handle_log(args.command).await,
        // Config commands never touch the network
        Commands::Config(args) => config::handle_config(args.command),
    }
}
