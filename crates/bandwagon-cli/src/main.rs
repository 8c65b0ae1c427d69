mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("🚀 BandWagon CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Plot(args) => {
            info!("Dispatching to 'plot' command.");
            commands::plot::run(args)
        }
        Commands::Digest(args) => {
            info!("Dispatching to 'digest' command.");
            commands::digest::run(args)
        }
        Commands::Grid(args) => {
            info!("Dispatching to 'grid' command.");
            commands::grid::run(args)
        }
        Commands::Report(args) => {
            info!("Dispatching to 'report' command.");
            commands::report::run(args)
        }
        Commands::Ladder(args) => {
            info!("Dispatching to 'ladder' command.");
            commands::ladder::run(args)
        }
        Commands::Enzymes(args) => {
            info!("Dispatching to 'enzymes' command.");
            commands::enzymes::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
