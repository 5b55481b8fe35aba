//! Command-line interface definition for archipel.
//!
//! # Command Structure
//!
//! - `archipel build` - Build the site once (or keep rebuilding with `--watch`)
//! - `archipel dev` - Build, serve with live reload, rebuild on change

mod commands;
mod tests;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{BuildArgs, Command, DevArgs, SiteArgs};
pub use validation::{ToolchainCommand, parse_toolchain};

/// Archipel - static pages with interactive islands
#[derive(Parser, Debug)]
#[command(
    name = "archipel",
    version,
    about = "Build static sites with interactive islands",
    long_about = "Archipel pre-renders every page under <content>/routes/ to HTML and bundles\n\
                  every *.island.svelte component under <content>/components/ for client-side\n\
                  hydration. Other files in the content directory are copied as-is."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the configuration file (default: ./archipel.config.json if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
