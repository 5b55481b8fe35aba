//! # archipel
//!
//! Build pipeline for islands-architecture static sites.
//!
//! A content directory holds page components under `routes/` and standalone
//! interactive components (`*.island.svelte`) under `components/`. One build
//! cycle:
//!
//! 1. cleans the output directory,
//! 2. concurrently bundles pages (kept in memory), bundles islands (written
//!    to `<out>/components/`) and copies every other asset,
//! 3. server-renders each page module, removes duplicated hydration scripts
//!    from its head, wraps it in a document and writes `<route>.html`.
//!
//! A page that fails to render never fails the build: it is written as a
//! placeholder carrying [`FAILURE_MARKER`] and reported in the
//! [`BuildSummary`].
//!
//! Component compilation, bundling and HTML formatting are delegated to an
//! external toolchain through the [`Bundler`], [`RenderSandbox`] and
//! [`HtmlFormatter`] traits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use archipel::{BuildOptions, Builder, ProcessToolchain, Toolchain};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let toolchain = ProcessToolchain::new(&["archipel-toolchain".to_string()])?;
//! let options = BuildOptions::new("_site", "build").minify(true);
//!
//! let summary = Builder::new(options, Toolchain::from_shared(Arc::new(toolchain)))
//!     .build()
//!     .await?;
//! println!("{summary}");
//! # Ok(()) }
//! ```

pub mod assets;
pub mod build;
pub mod dedup;
pub mod discovery;
pub mod document;
pub mod options;
pub mod ssr;
pub mod toolchain;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::path::PathBuf;

pub use assets::{AssetReport, copy_assets};
pub use build::{BuildSummary, Builder, Pass, RouteBuildOutcome, clean};
pub use dedup::dedupe_scripts;
pub use discovery::{SourceFile, SourceKind, discover};
pub use document::assemble;
pub use options::{BuildOptions, slashify, slashify_base};
pub use ssr::{FAILURE_MARKER, RenderResult, escape_html, render_route};
pub use toolchain::{
    BundleOutput, BundleRequest, Bundler, BundlerPlugin, CompiledModule, HtmlFormatter,
    ModuleFormat, PassthroughFormatter, ProcessToolchain, RawRenderOutput, RenderError,
    RenderSandbox, Toolchain, ToolchainError,
};

/// Error types for archipel build operations.
///
/// Only fatal conditions are represented here. Per-route render failures and
/// per-file copy failures are recovered inside the build and reported through
/// [`BuildSummary`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The output directory could not be removed or recreated.
    #[error("Failed to clean output directory {}: {source}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the content directory failed.
    #[error("Failed to discover sources under {}: {message}", .path.display())]
    Discovery { path: PathBuf, message: String },

    /// The bundler rejected or failed one of the compilation passes.
    #[error("{pass} pass failed: {source}")]
    Bundle {
        pass: Pass,
        #[source]
        source: ToolchainError,
    },

    /// Build options are inconsistent (e.g. output directory contains the sources).
    #[error("Invalid build options: {0}")]
    InvalidOptions(String),

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
