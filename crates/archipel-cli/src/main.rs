//! Archipel CLI entry point.
//!
//! Parses arguments, initializes logging and dispatches to the command
//! implementations.

use archipel_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let config_path = args.config.as_deref();
    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args, config_path).await,
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args, config_path).await,
    };

    result.map_err(error::cli_error_to_miette)
}
