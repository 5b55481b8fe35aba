//! The build orchestrator: one full cycle from sources to output tree.

use futures::future::join_all;
use path_clean::PathClean;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::assets::{AssetReport, copy_assets};
use crate::discovery::{SourceFile, SourceKind, discover};
use crate::document::assemble;
use crate::options::BuildOptions;
use crate::ssr::{RenderResult, render_route};
use crate::toolchain::{BundleRequest, BundlerPlugin, CompiledModule, ModuleFormat, Toolchain};
use crate::{Error, Result};

/// The two bundler passes of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Server build of the pages, kept in memory for rendering.
    Pages,
    /// Client build of the islands, written to `<out>/components/`.
    Islands,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Pages => f.write_str("page"),
            Pass::Islands => f.write_str("island"),
        }
    }
}

/// Result of building one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBuildOutcome {
    pub output_path: PathBuf,
    pub failed: bool,
}

/// What a finished cycle produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub routes: usize,
    pub elapsed: Duration,
    /// Output paths of routes written as placeholders (or not written).
    pub failed_routes: Vec<PathBuf>,
    /// Assets that could not be copied, relative to the content root.
    pub failed_assets: Vec<PathBuf>,
    pub islands: usize,
    pub assets: usize,
}

impl BuildSummary {
    /// Wall time in whole milliseconds, rounded up.
    pub fn elapsed_ms(&self) -> u128 {
        let nanos = self.elapsed.as_nanos();
        nanos.div_ceil(1_000_000)
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Built {} routes in {}ms", self.routes, self.elapsed_ms())
    }
}

/// Remove and recreate the output directory.
///
/// A missing directory is not an error.
pub async fn clean(out_dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(out_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(Error::Clean {
                path: out_dir.to_path_buf(),
                source,
            });
        }
    }

    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| Error::Clean {
            path: out_dir.to_path_buf(),
            source,
        })
}

/// Runs full build cycles for one set of options.
///
/// # Example
///
/// ```no_run
/// use archipel::{BuildOptions, Builder, ProcessToolchain, Toolchain};
/// use std::sync::Arc;
///
/// # async fn run() -> archipel::Result<()> {
/// let toolchain = ProcessToolchain::new(&["archipel-toolchain".to_string()])
///     .expect("toolchain command");
/// let builder = Builder::new(
///     BuildOptions::new("_site", "build"),
///     Toolchain::from_shared(Arc::new(toolchain)),
/// );
/// let summary = builder.build().await?;
/// assert!(summary.failed_routes.is_empty());
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    options: BuildOptions,
    toolchain: Toolchain,
}

impl Builder {
    pub fn new(options: BuildOptions, toolchain: Toolchain) -> Self {
        Self { options, toolchain }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Run one full cycle: clean, discover, compile, render, write.
    pub async fn build(&self) -> Result<BuildSummary> {
        let started = Instant::now();
        self.options.validate()?;

        clean(&self.options.out_dir).await?;

        let content_dir = &self.options.content_dir;
        let (pages, islands) = tokio::try_join!(
            discover(content_dir, SourceKind::Page),
            discover(content_dir, SourceKind::Island),
        )?;
        tracing::debug!(pages = pages.len(), islands = islands.len(), "sources discovered");

        let (routes, island_count, assets) = tokio::join!(
            self.build_pages(&pages),
            self.build_islands(&islands),
            copy_assets(content_dir, &self.options.out_dir),
        );
        let routes = routes?;
        let island_count = island_count?;
        let assets: AssetReport = assets?;

        let summary = BuildSummary {
            routes: routes.len(),
            elapsed: started.elapsed(),
            failed_routes: routes
                .into_iter()
                .filter(|route| route.failed)
                .map(|route| route.output_path)
                .collect(),
            failed_assets: assets.failed,
            islands: island_count,
            assets: assets.copied.len(),
        };

        tracing::debug!(
            routes = summary.routes,
            failed = summary.failed_routes.len(),
            islands = summary.islands,
            assets = summary.assets,
            elapsed_ms = summary.elapsed_ms() as u64,
            "build finished"
        );
        Ok(summary)
    }

    fn plugins(&self) -> Vec<BundlerPlugin> {
        vec![
            BundlerPlugin::Components {
                content_dir: self.options.content_dir.clone(),
                base: self.options.base.clone(),
            },
            BundlerPlugin::ComponentRuntime,
        ]
    }

    fn request(&self, sources: &[SourceFile], pass: Pass) -> BundleRequest {
        let (outdir, outbase, write, splitting) = match pass {
            Pass::Pages => (
                self.options.out_dir.clone(),
                Some(self.options.routes_dir()),
                false,
                false,
            ),
            Pass::Islands => (self.options.islands_out_dir(), None, true, true),
        };

        BundleRequest {
            entry_points: sources.iter().map(|s| s.path.clone()).collect(),
            outdir,
            outbase,
            write,
            splitting,
            minify: self.options.minify,
            format: ModuleFormat::Esm,
            bundle: true,
            plugins: self.plugins(),
        }
    }

    async fn build_pages(&self, pages: &[SourceFile]) -> Result<Vec<RouteBuildOutcome>> {
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let request = self.request(pages, Pass::Pages);
        let output = self
            .toolchain
            .bundler
            .bundle(&request)
            .await
            .map_err(|source| Error::Bundle {
                pass: Pass::Pages,
                source,
            })?;

        let modules: HashMap<PathBuf, CompiledModule> = output
            .output_files
            .into_iter()
            .map(|module| (lookup_key(&module.path), module))
            .collect();

        Ok(join_all(pages.iter().map(|page| self.build_route(page, &modules))).await)
    }

    async fn build_islands(&self, islands: &[SourceFile]) -> Result<usize> {
        if islands.is_empty() {
            return Ok(0);
        }

        let request = self.request(islands, Pass::Islands);
        self.toolchain
            .bundler
            .bundle(&request)
            .await
            .map_err(|source| Error::Bundle {
                pass: Pass::Islands,
                source,
            })?;
        Ok(islands.len())
    }

    /// Where a page's document is written: its path below `routes/`, as `.html`.
    pub fn route_output_path(&self, page: &SourceFile) -> PathBuf {
        let routes_dir = self.options.routes_dir();
        let relative = page
            .path
            .strip_prefix(&routes_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| page.path.file_name().map(PathBuf::from).unwrap_or_default());
        self.options.out_dir.join(relative).with_extension("html")
    }

    async fn build_route(
        &self,
        page: &SourceFile,
        modules: &HashMap<PathBuf, CompiledModule>,
    ) -> RouteBuildOutcome {
        let output_path = self.route_output_path(page);
        let module_path = output_path.with_extension("js");

        let result = match modules.get(&lookup_key(&module_path)) {
            Some(module) => render_route(self.toolchain.sandbox.as_ref(), module).await,
            None => {
                tracing::warn!(page = %page.path.display(), "bundler produced no module for page");
                RenderResult::degraded(&format!(
                    "No compiled module for {}",
                    page.path.display()
                ))
            }
        };

        let document = assemble(self.toolchain.formatter.as_ref(), &result).await;
        let failed = match write_document(&output_path, &document).await {
            Ok(()) => result.is_degraded(),
            Err(e) => {
                tracing::warn!(route = %output_path.display(), error = %e, "failed to write route");
                true
            }
        };

        tracing::debug!(route = %output_path.display(), failed, "route built");
        RouteBuildOutcome {
            output_path,
            failed,
        }
    }
}

async fn write_document(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
}

/// Bundlers may report relative or absolute paths; compare absolute clean forms.
fn lookup_key(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .clean()
}
