//! Watch mode: dev server, file watcher and rebuild scheduling.
//!
//! - Live reload via Server-Sent Events
//! - Static serving of the output directory under the `base` prefix
//! - Error page while the last rebuild failed
//! - Debounced, non-overlapping rebuilds

pub mod config;
pub mod error_page;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod watcher;

pub use config::DevConfig;
pub use scheduler::{RebuildScheduler, drive};
pub use server::DevServer;
pub use state::{BuildStatus, DevServerState, SharedState};
pub use watcher::{FileChange, FileWatcher};

use serde::{Deserialize, Serialize};

/// Events pushed to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    /// A rebuild started
    BuildStarted,

    /// A rebuild finished; browsers reload
    BuildCompleted {
        duration_ms: u64,
        failed_routes: usize,
    },

    /// A rebuild failed fatally; browsers show the error page
    BuildFailed { error: String },

    /// A browser connected
    ClientConnected { id: usize },
}
