mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use trang_gate::logging;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize structured logging
    logging::init(if cli.verbose { "debug" } else { "info" });

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Run(args) => commands::run::run(&args),
        Commands::Status(args) => commands::status::run(&args),
        Commands::Config(args) => commands::config::run(args.command),
        Commands::Init(args) => commands::init::run(args),
    }
}
