//! # League Analytics CLI Binary
//!
//! Command-line interface for inspecting a league snapshot.

use anyhow::Result;
use clap::Parser;
use league_analytics::cli::{write_config, Cli, CliHandler, Commands};
use league_analytics::logging;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // Initialize logging
    logging::initialize_from_config(&config.logging)?;

    if let Commands::InitConfig { path } = &cli.command {
        return write_config(&config, path);
    }

    // Create CLI handler
    let handler = CliHandler::new(&cli.snapshot, config)?;

    // Handle command
    handler.handle_command(cli.command, cli.season, cli.all_time)?;

    Ok(())
}
