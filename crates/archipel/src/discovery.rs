//! Route and island discovery.
//!
//! Pages live under `<content>/routes/` and are any `*.svelte` file. Islands
//! live under `<content>/components/` and must end in `.island.svelte`;
//! plain components there are only reachable through imports.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Extension shared by every component source.
pub const COMPONENT_EXTENSION: &str = ".svelte";

/// Suffix marking a component as an independently hydrated island.
pub const ISLAND_SUFFIX: &str = ".island.svelte";

/// Subdirectory of the content root holding pages.
pub const ROUTES_DIR: &str = "routes";

/// Subdirectory of the content root holding components.
pub const COMPONENTS_DIR: &str = "components";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// A route; one HTML document per page.
    Page,
    /// An island; bundled for client-side hydration.
    Island,
}

impl SourceKind {
    /// Subdirectory of the content root this kind is discovered in.
    pub fn subdir(self) -> &'static str {
        match self {
            SourceKind::Page => ROUTES_DIR,
            SourceKind::Island => COMPONENTS_DIR,
        }
    }

    /// Whether a file name belongs to this kind.
    pub fn matches(self, file_name: &str) -> bool {
        match self {
            SourceKind::Page => file_name.ends_with(COMPONENT_EXTENSION),
            SourceKind::Island => file_name.ends_with(ISLAND_SUFFIX),
        }
    }
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Discover sources of one kind below `content_dir`.
///
/// The walk runs on the blocking pool. Results are sorted by path so every
/// cycle sees the same order.
pub async fn discover(content_dir: &Path, kind: SourceKind) -> Result<Vec<SourceFile>> {
    let root = content_dir.join(kind.subdir());
    tokio::task::spawn_blocking(move || discover_blocking(&root, kind))
        .await
        .map_err(|e| Error::Task(format!("discovery task failed: {e}")))?
}

/// Synchronous discovery under `root` (the `routes/` or `components/` dir).
fn discover_blocking(root: &Path, kind: SourceKind) -> Result<Vec<SourceFile>> {
    if !root.exists() {
        tracing::debug!(root = %root.display(), ?kind, "source directory missing");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| Error::Discovery {
            path: e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry.file_name().to_str().is_some_and(|name| kind.matches(name));
        if matches {
            files.push(SourceFile {
                path: entry.into_path(),
                kind,
            });
        }
    }

    files.sort();
    tracing::debug!(root = %root.display(), ?kind, count = files.len(), "discovered sources");
    Ok(files)
}
