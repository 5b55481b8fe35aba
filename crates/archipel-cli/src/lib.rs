//! Archipel CLI - build and serve islands-architecture static sites.
//!
//! This crate provides the `archipel` command on top of the [`archipel`]
//! build pipeline: argument parsing, layered configuration, logging, terminal
//! output and the watch-mode dev server.
//!
//! # Architecture
//!
//! - [`cli`] - clap definitions for `archipel build` and `archipel dev`
//! - [`config`] - figment-based configuration (defaults, file, env, flags)
//! - [`error`] - error types with actionable hints
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines on stderr
//! - [`commands`] - command implementations
//! - [`dev`] - dev server, file watcher and rebuild scheduling
//!
//! # Example
//!
//! ```rust,no_run
//! use archipel_cli::{config::ArchipelConfig, commands};
//!
//! # async fn run() -> archipel_cli::Result<()> {
//! let config = ArchipelConfig::load(None, &Default::default())?;
//! config.validate()?;
//! let toolchain = commands::toolchain_from_config(&config)?;
//! commands::build::run_build(&config, toolchain).await?;
//! # Ok(()) }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
