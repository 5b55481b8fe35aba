//! Boundary to the external component toolchain.
//!
//! Three collaborators do the JavaScript-side work:
//!
//! - a [`Bundler`] that compiles and bundles component sources,
//! - a [`RenderSandbox`] that evaluates a compiled page module and calls its
//!   server `render()`,
//! - an [`HtmlFormatter`] that pretty-prints finished documents.
//!
//! [`ProcessToolchain`] implements all three by driving an external command.

pub mod process;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use process::ProcessToolchain;

/// Output module format requested from the bundler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    #[default]
    Esm,
}

/// Named hook plugins the bundler must install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum BundlerPlugin {
    /// Compiles component sources. `contentDir` and `base` locate island
    /// imports so pages can emit hydration scripts for them.
    #[serde(rename_all = "camelCase")]
    Components { content_dir: PathBuf, base: String },
    /// Resolves the component framework's runtime imports.
    ComponentRuntime,
}

/// One bundler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub entry_points: Vec<PathBuf>,
    pub outdir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbase: Option<PathBuf>,
    /// `false` keeps the outputs in memory and returns them.
    pub write: bool,
    pub splitting: bool,
    pub minify: bool,
    pub format: ModuleFormat,
    pub bundle: bool,
    pub plugins: Vec<BundlerPlugin>,
}

/// An output file of the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledModule {
    pub path: PathBuf,
    pub text: String,
}

/// Bundler response. `output_files` is empty when the request wrote to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutput {
    #[serde(default)]
    pub output_files: Vec<CompiledModule>,
}

/// Stylesheet extracted during server rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCss {
    pub code: String,
}

/// What a page module's `render()` returns, checked for shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRenderOutput {
    pub html: String,
    pub head: String,
    #[serde(default)]
    pub css: Option<RawCss>,
}

impl RawRenderOutput {
    /// Parse a JSON render result, reporting any mismatch as [`RenderError::Shape`].
    pub fn from_json(text: &str) -> Result<Self, RenderError> {
        serde_json::from_str(text).map_err(|e| RenderError::Shape(e.to_string()))
    }
}

/// Errors talking to the external toolchain.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("Toolchain command is empty")]
    EmptyCommand,

    #[error("Failed to spawn toolchain `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` timed out after {}ms", .timeout.as_millis())]
    Timeout { command: String, timeout: Duration },

    #[error("Invalid toolchain response: {0}")]
    InvalidResponse(String),

    #[error("Toolchain unavailable: {0}")]
    Unavailable(String),

    #[error("Toolchain I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors rendering one page module.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The module failed to load or its `render()` threw. Carries the
    /// thrown value's string form.
    #[error("{0}")]
    Evaluation(String),

    /// `render()` returned something other than `{ html, head, css? }`.
    #[error("render() returned an unexpected value: {0}")]
    Shape(String),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
}

#[async_trait]
pub trait Bundler: Send + Sync + Debug {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, ToolchainError>;
}

#[async_trait]
pub trait RenderSandbox: Send + Sync + Debug {
    /// Evaluate `module` in isolation and call its default export's `render()`.
    async fn render(&self, module: &CompiledModule) -> Result<RawRenderOutput, RenderError>;
}

#[async_trait]
pub trait HtmlFormatter: Send + Sync + Debug {
    async fn format(&self, html: &str) -> Result<String, ToolchainError>;
}

/// Formatter that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

#[async_trait]
impl HtmlFormatter for PassthroughFormatter {
    async fn format(&self, html: &str) -> Result<String, ToolchainError> {
        Ok(html.to_string())
    }
}

/// The set of collaborators one build uses.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub bundler: Arc<dyn Bundler>,
    pub sandbox: Arc<dyn RenderSandbox>,
    pub formatter: Arc<dyn HtmlFormatter>,
}

impl Toolchain {
    pub fn new(
        bundler: Arc<dyn Bundler>,
        sandbox: Arc<dyn RenderSandbox>,
        formatter: Arc<dyn HtmlFormatter>,
    ) -> Self {
        Self {
            bundler,
            sandbox,
            formatter,
        }
    }

    /// Use one value implementing every role.
    pub fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: Bundler + RenderSandbox + HtmlFormatter + 'static,
    {
        Self {
            bundler: shared.clone(),
            sandbox: shared.clone(),
            formatter: shared,
        }
    }

    /// Replace the formatter, e.g. with [`PassthroughFormatter`].
    pub fn with_formatter(mut self, formatter: Arc<dyn HtmlFormatter>) -> Self {
        self.formatter = formatter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundle_request_wire_format() {
        let request = BundleRequest {
            entry_points: vec![PathBuf::from("_site/routes/index.svelte")],
            outdir: PathBuf::from("build/"),
            outbase: Some(PathBuf::from("_site/routes/")),
            write: false,
            splitting: false,
            minify: true,
            format: ModuleFormat::Esm,
            bundle: true,
            plugins: vec![
                BundlerPlugin::Components {
                    content_dir: PathBuf::from("_site/"),
                    base: "/".to_string(),
                },
                BundlerPlugin::ComponentRuntime,
            ],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "entryPoints": ["_site/routes/index.svelte"],
                "outdir": "build/",
                "outbase": "_site/routes/",
                "write": false,
                "splitting": false,
                "minify": true,
                "format": "esm",
                "bundle": true,
                "plugins": [
                    { "name": "components", "contentDir": "_site/", "base": "/" },
                    { "name": "component-runtime" }
                ]
            })
        );
    }

    #[test]
    fn test_outbase_omitted_when_absent() {
        let request = BundleRequest {
            entry_points: vec![],
            outdir: PathBuf::from("build/components/"),
            outbase: None,
            write: true,
            splitting: true,
            minify: false,
            format: ModuleFormat::Esm,
            bundle: true,
            plugins: vec![],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("outbase").is_none());
    }

    #[test]
    fn test_bundle_output_defaults_to_empty() {
        let output: BundleOutput = serde_json::from_str("{}").unwrap();
        assert!(output.output_files.is_empty());
    }

    #[test]
    fn test_render_output_shape() {
        let ok = RawRenderOutput::from_json(r#"{"html":"<p>x</p>","head":"","css":null}"#).unwrap();
        assert_eq!(ok.html, "<p>x</p>");
        assert!(ok.css.is_none());

        let with_css =
            RawRenderOutput::from_json(r#"{"html":"","head":"","css":{"code":"p{}"}}"#).unwrap();
        assert_eq!(with_css.css.unwrap().code, "p{}");

        let missing_html = RawRenderOutput::from_json(r#"{"head":""}"#).unwrap_err();
        assert!(matches!(missing_html, RenderError::Shape(_)));

        let wrong_type = RawRenderOutput::from_json(r#"{"html":1,"head":""}"#).unwrap_err();
        assert!(matches!(wrong_type, RenderError::Shape(_)));
    }

    #[tokio::test]
    async fn test_passthrough_formatter() {
        let html = "<p>x</p>";
        assert_eq!(PassthroughFormatter.format(html).await.unwrap(), html);
    }
}
