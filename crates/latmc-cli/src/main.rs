mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod setup;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\nError: {e}");
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("latmc v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let result = match cli.command {
        Commands::Run(args) => {
            info!("Dispatching to 'run' command.");
            commands::run::execute(args)
        }
        Commands::Check(args) => {
            info!("Dispatching to 'check' command.");
            commands::check::execute(args)
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {e}");
    }
    result
}
