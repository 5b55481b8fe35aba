//! Configuration with multi-source loading.
//!
//! Merges settings from CLI flags, environment variables and a config file.
//! Priority: CLI > Environment (`ARCHIPEL_*`) > File > Defaults

mod defaults;
mod loading;
mod tests;
mod validation;

use archipel::BuildOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAME, ENV_PREFIX};

/// Archipel configuration, loaded from `archipel.config.json`, the
/// environment and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArchipelConfig {
    /// URL path prefix the site is served under
    #[serde(default = "default_base")]
    pub base: String,

    /// Output directory
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Content directory (routes/, components/, assets)
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Minify bundles in watch mode (one-shot builds always minify)
    #[serde(default)]
    pub minify: bool,

    /// Serve and rebuild on change
    #[serde(default)]
    pub watch: bool,

    /// Dev server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Debounce window for change events, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Toolchain command line: program followed by fixed arguments
    #[serde(default = "default_toolchain")]
    pub toolchain: Vec<String>,

    /// Timeout for one toolchain call, in milliseconds
    #[serde(default = "default_toolchain_timeout_ms")]
    pub toolchain_timeout_ms: u64,

    /// Maximum number of toolchain processes running at once
    #[serde(default = "default_render_concurrency")]
    pub render_concurrency: usize,

    /// Pretty-print documents through the toolchain formatter
    #[serde(default = "default_format_html")]
    pub format_html: bool,

    /// Fail the command when any route fails to render
    #[serde(default)]
    pub strict: bool,
}

/// Values set explicitly on the command line. Unset fields are not
/// serialized, so they never shadow lower-priority sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_html: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ArchipelConfig {
    /// Minification actually applied: always for one-shot builds, opt-in
    /// while watching.
    pub fn effective_minify(&self) -> bool {
        !self.watch || self.minify
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn toolchain_timeout(&self) -> Duration {
        Duration::from_millis(self.toolchain_timeout_ms)
    }

    /// Options for one build cycle.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::new(&self.content_dir, &self.out_dir)
            .base(&self.base)
            .minify(self.effective_minify())
    }
}

impl Default for ArchipelConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            out_dir: default_out_dir(),
            content_dir: default_content_dir(),
            minify: false,
            watch: false,
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            toolchain: default_toolchain(),
            toolchain_timeout_ms: default_toolchain_timeout_ms(),
            render_concurrency: default_render_concurrency(),
            format_html: default_format_html(),
            strict: false,
        }
    }
}
