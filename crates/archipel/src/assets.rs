//! Static asset copying.
//!
//! Everything under the content root that is not a component source is
//! mirrored into the output directory byte for byte.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::discovery::COMPONENT_EXTENSION;
use crate::options::absolute;
use crate::{Error, Result};

/// Outcome of one asset copy run. Paths are relative to the content root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    pub copied: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Copy every non-component file from `content_dir` to `out_dir`.
///
/// Hidden entries and anything inside `out_dir` (when it is nested in the
/// content tree) are skipped. A failing file is logged and recorded; the
/// other copies still run.
pub async fn copy_assets(content_dir: &Path, out_dir: &Path) -> Result<AssetReport> {
    let content_dir = absolute(content_dir)?;
    let out_dir = absolute(out_dir)?;

    let listing = {
        let content_dir = content_dir.clone();
        let out_dir = out_dir.clone();
        tokio::task::spawn_blocking(move || list_assets(&content_dir, &out_dir))
            .await
            .map_err(|e| Error::Task(format!("asset listing task failed: {e}")))??
    };

    let copies = listing.into_iter().map(|rel| {
        let from = content_dir.join(&rel);
        let to = out_dir.join(&rel);
        async move {
            let result = copy_one(&from, &to).await;
            (rel, result)
        }
    });

    let mut report = AssetReport::default();
    for (rel, result) in join_all(copies).await {
        match result {
            Ok(()) => {
                tracing::debug!(asset = %rel.display(), "copied asset");
                report.copied.push(rel);
            }
            Err(e) => {
                tracing::warn!(asset = %rel.display(), error = %e, "failed to copy asset");
                report.failed.push(rel);
            }
        }
    }

    Ok(report)
}

/// Relative paths of every asset below `content_dir`, sorted.
fn list_assets(content_dir: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if !content_dir.exists() {
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(content_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, out_dir));

    let mut assets = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::Discovery {
            path: e.path().map_or_else(|| content_dir.to_path_buf(), Path::to_path_buf),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() || is_component(&entry) {
            continue;
        }

        if let Ok(rel) = entry.path().strip_prefix(content_dir) {
            assets.push(rel.to_path_buf());
        }
    }

    assets.sort();
    Ok(assets)
}

async fn copy_one(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(from, to).await?;
    Ok(())
}

fn is_excluded(entry: &DirEntry, out_dir: &Path) -> bool {
    let hidden = entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'));
    hidden || entry.path().starts_with(out_dir)
}

fn is_component(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.ends_with(COMPONENT_EXTENSION))
}
