//! File system watcher for watch mode.
//!
//! Watches the content directory recursively and forwards create and modify
//! events for source paths. Debouncing is left to the scheduler.

use crate::error::{Result, ResultExt};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Change events buffered between the notify thread and the watch loop.
const EVENT_BUFFER: usize = 256;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was created
    Created(PathBuf),
    /// File was modified
    Modified(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Created(p) | FileChange::Modified(p) => p,
        }
    }

    /// Map a notify event kind; removals and access events are not changes.
    fn from_kind(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            _ => None,
        }
    }
}

/// Recursive watcher over the content directory.
///
/// Dropping it stops the notifications and closes the channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root`, ignoring everything under `out_dir`.
    pub fn new(root: &Path, out_dir: &Path) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        // notify reports canonical paths on some platforms
        let root = root.canonicalize().with_path(root)?;
        let out_dir = absolute_out_dir(out_dir);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let filter_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };

            for path in event.paths {
                if should_ignore(&path, &filter_root, &out_dir) {
                    continue;
                }
                if let Some(change) = FileChange::from_kind(&event.kind, path) {
                    // Fails only once the watch loop is gone
                    let _ = tx.blocking_send(change);
                }
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// The output directory may not exist yet, so it is canonicalized only when
/// possible.
fn absolute_out_dir(out_dir: &Path) -> PathBuf {
    out_dir
        .canonicalize()
        .or_else(|_| std::path::absolute(out_dir))
        .unwrap_or_else(|_| out_dir.to_path_buf())
}

/// Paths outside the root, inside the output directory or hidden do not
/// trigger rebuilds.
pub(crate) fn should_ignore(path: &Path, root: &Path, out_dir: &Path) -> bool {
    if path.starts_with(out_dir) {
        return true;
    }

    let Ok(rel_path) = path.strip_prefix(root) else {
        return true;
    };

    rel_path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
    })
}
