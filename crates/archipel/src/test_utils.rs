//! Test utilities for archipel.
//!
//! Available in this crate's tests and, through the `test-utils` feature, in
//! downstream integration tests.
//!
//! ## Key Components
//!
//! - [`FakeToolchain`]: bundles by passing page sources through unchanged and
//!   renders by parsing them as JSON render results. A source of the form
//!   `throw:<msg>` makes rendering fail with `Error: <msg>`.
//! - [`FailingFormatter`]: a formatter that always errors.
//!
//! ## Usage Example
//!
//! ```rust
//! use archipel::test_utils::{FakeToolchain, write_file};
//! use archipel::{BuildOptions, Builder};
//! use std::sync::Arc;
//! use tempfile::TempDir;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let temp = TempDir::new().unwrap();
//! let site = temp.path().join("_site");
//! write_file(&site, "routes/index.svelte", r#"{"html":"<h1>Hi</h1>","head":""}"#).unwrap();
//!
//! let fake = Arc::new(FakeToolchain::new());
//! let options = BuildOptions::new(&site, temp.path().join("build"));
//! let summary = Builder::new(options, fake.toolchain()).build().await.unwrap();
//! assert_eq!(summary.routes, 1);
//! # }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::toolchain::{
    BundleOutput, BundleRequest, Bundler, CompiledModule, HtmlFormatter, RawRenderOutput,
    RenderError, RenderSandbox, Toolchain, ToolchainError,
};

/// Which bundler calls a [`FakeToolchain`] should fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BundleFailure {
    #[default]
    Never,
    /// Fail the in-memory page pass.
    Pages,
    /// Fail the writing island pass.
    Islands,
}

/// In-process stand-in for the external toolchain.
#[derive(Debug, Default)]
pub struct FakeToolchain {
    failure: BundleFailure,
    drop_modules: bool,
    requests: Mutex<Vec<BundleRequest>>,
    renders: AtomicUsize,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given pass fail with a bundler error.
    pub fn failing(mut self, failure: BundleFailure) -> Self {
        self.failure = failure;
        self
    }

    /// Make the page pass succeed without returning any module.
    pub fn without_modules(mut self) -> Self {
        self.drop_modules = true;
        self
    }

    /// A [`Toolchain`] sharing this fake, so calls can be inspected afterwards.
    pub fn toolchain(self: &Arc<Self>) -> Toolchain {
        Toolchain::from_shared(Arc::clone(self))
    }

    pub fn into_toolchain(self) -> Toolchain {
        Toolchain::from_shared(Arc::new(self))
    }

    /// Every bundle request received so far, in call order.
    pub fn requests(&self) -> Vec<BundleRequest> {
        self.requests.lock().clone()
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    async fn compile_pages(&self, request: &BundleRequest) -> Result<BundleOutput, ToolchainError> {
        if self.drop_modules {
            return Ok(BundleOutput::default());
        }

        let mut output_files = Vec::with_capacity(request.entry_points.len());
        for entry in &request.entry_points {
            let text = tokio::fs::read_to_string(entry).await?;
            output_files.push(CompiledModule {
                path: module_path(request, entry),
                text,
            });
        }
        Ok(BundleOutput { output_files })
    }

    async fn write_islands(&self, request: &BundleRequest) -> Result<BundleOutput, ToolchainError> {
        tokio::fs::create_dir_all(&request.outdir).await?;
        for entry in &request.entry_points {
            let name = entry
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("island.svelte");
            let stem = name.strip_suffix(".svelte").unwrap_or(name);
            tokio::fs::write(
                request.outdir.join(format!("{stem}.js")),
                format!("// island {name}\n"),
            )
            .await?;
        }
        Ok(BundleOutput::default())
    }
}

fn module_path(request: &BundleRequest, entry: &Path) -> PathBuf {
    let relative = request
        .outbase
        .as_deref()
        .and_then(|base| entry.strip_prefix(base).ok())
        .map(Path::to_path_buf)
        .or_else(|| entry.file_name().map(PathBuf::from))
        .unwrap_or_default();
    request.outdir.join(relative).with_extension("js")
}

#[async_trait]
impl Bundler for FakeToolchain {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, ToolchainError> {
        self.requests.lock().push(request.clone());

        let failing = match self.failure {
            BundleFailure::Never => false,
            BundleFailure::Pages => !request.write,
            BundleFailure::Islands => request.write,
        };
        if failing {
            return Err(ToolchainError::Failed {
                command: "fake bundle".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Could not resolve \"./Missing.svelte\"".to_string(),
            });
        }

        if request.write {
            self.write_islands(request).await
        } else {
            self.compile_pages(request).await
        }
    }
}

#[async_trait]
impl RenderSandbox for FakeToolchain {
    async fn render(&self, module: &CompiledModule) -> Result<RawRenderOutput, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let text = module.text.trim();
        match text.strip_prefix("throw:") {
            Some(message) => Err(RenderError::Evaluation(format!("Error: {message}"))),
            None => RawRenderOutput::from_json(text),
        }
    }
}

#[async_trait]
impl HtmlFormatter for FakeToolchain {
    async fn format(&self, html: &str) -> Result<String, ToolchainError> {
        Ok(html.to_string())
    }
}

/// Formatter that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingFormatter;

#[async_trait]
impl HtmlFormatter for FailingFormatter {
    async fn format(&self, _html: &str) -> Result<String, ToolchainError> {
        Err(ToolchainError::InvalidResponse(
            "SyntaxError: Unexpected closing tag".to_string(),
        ))
    }
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// A JSON render result for a page source that renders `html`.
pub fn page_source(html: &str, head: &str) -> String {
    serde_json::json!({ "html": html, "head": head }).to_string()
}
