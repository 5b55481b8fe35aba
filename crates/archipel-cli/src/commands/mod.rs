//! Command implementations.
//!
//! - [`build`] - one-shot build (or watch mode with `--watch`)
//! - [`dev`] - build, serve and rebuild on change

pub mod build;
pub mod dev;

pub use build::execute as build_execute;
pub use dev::execute as dev_execute;

use crate::config::ArchipelConfig;
use crate::error::Result;
use archipel::{PassthroughFormatter, ProcessToolchain, Toolchain};
use std::sync::Arc;

/// The external toolchain described by the configuration.
pub fn toolchain_from_config(config: &ArchipelConfig) -> Result<Toolchain> {
    let process = ProcessToolchain::new(&config.toolchain)?
        .timeout(config.toolchain_timeout())
        .max_concurrency(config.render_concurrency);

    let toolchain = Toolchain::from_shared(Arc::new(process));
    if config.format_html {
        Ok(toolchain)
    } else {
        Ok(toolchain.with_formatter(Arc::new(PassthroughFormatter)))
    }
}
