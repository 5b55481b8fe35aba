use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::{ToolchainCommand, parse_toolchain};
use crate::config::ConfigOverrides;

/// Available archipel subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the site
    ///
    /// Cleans the output directory, renders every route to HTML, bundles the
    /// islands and copies static assets. Output is minified unless watching.
    Build(BuildArgs),

    /// Start the development server
    ///
    /// Same as `build --watch`: builds, serves the output directory with live
    /// reload and rebuilds whenever the content directory changes.
    Dev(DevArgs),
}

/// Options shared by every command that builds the site.
///
/// Every flag is optional so that unset flags leave configuration file and
/// environment values in place.
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// URL path prefix the site is served under (e.g. /docs/)
    #[arg(long, value_name = "PATH")]
    pub base: Option<String>,

    /// Output directory, recreated on every build
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Content directory holding routes/, components/ and assets
    #[arg(short = 's', long, value_name = "DIR")]
    pub content_dir: Option<PathBuf>,

    /// Minify bundled JavaScript (always on for one-shot builds)
    #[arg(short, long)]
    pub minify: bool,

    /// Toolchain command line, e.g. "node toolchain/archipel-toolchain.mjs"
    #[arg(long, value_parser = parse_toolchain, value_name = "COMMAND")]
    pub toolchain: Option<ToolchainCommand>,

    /// Write documents without pretty-printing them
    #[arg(long)]
    pub no_format: bool,

    /// Exit with an error when any route fails to render
    #[arg(long)]
    pub strict: bool,
}

impl SiteArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base: self.base.clone(),
            out_dir: self.out_dir.clone(),
            content_dir: self.content_dir.clone(),
            minify: self.minify.then_some(true),
            toolchain: self.toolchain.clone().map(|t| t.0),
            format_html: self.no_format.then_some(false),
            strict: self.strict.then_some(true),
            ..ConfigOverrides::default()
        }
    }
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Keep running: serve the output and rebuild on change
    #[arg(short, long)]
    pub watch: bool,

    /// Dev server port (with --watch)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..), value_name = "PORT", requires = "watch")]
    pub port: Option<u16>,

    /// Quiet period after the last change before rebuilding (with --watch)
    #[arg(long, value_name = "MS", requires = "watch")]
    pub debounce_ms: Option<u64>,
}

impl BuildArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            watch: self.watch.then_some(true),
            port: self.port,
            debounce_ms: self.debounce_ms,
            ..self.site.overrides()
        }
    }
}

/// Arguments for the dev command
#[derive(Args, Debug, Clone, Default)]
pub struct DevArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Dev server port; the next free port is used if it is busy
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..), value_name = "PORT")]
    pub port: Option<u16>,

    /// Quiet period after the last change before rebuilding
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

impl DevArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            watch: Some(true),
            port: self.port,
            debounce_ms: self.debounce_ms,
            ..self.site.overrides()
        }
    }
}
