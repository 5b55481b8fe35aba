//! Shared state for the development server.
//!
//! Build status and the SSE client registry, behind parking_lot locks.

use crate::dev::DevEvent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::mpsc;

/// Events buffered per client before new ones are dropped for it.
const CLIENT_BUFFER: usize = 100;

/// Build status tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// No build has been performed yet
    NotStarted,
    /// Build is currently in progress
    InProgress { started_at: Instant },
    /// Build completed; some routes may have been degraded
    Success {
        duration_ms: u64,
        failed_routes: usize,
    },
    /// Build failed with a fatal error
    Failed { error: String },
}

impl BuildStatus {
    /// Get error message if failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Connected SSE clients.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

/// Shared development server state.
pub struct DevServerState {
    status: RwLock<BuildStatus>,
    clients: ClientRegistry,
    next_client_id: AtomicUsize,
    out_dir: PathBuf,
    base: String,
}

impl DevServerState {
    pub fn new(out_dir: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            status: RwLock::new(BuildStatus::NotStarted),
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: AtomicUsize::new(0),
            out_dir: out_dir.into(),
            base: base.into(),
        }
    }

    pub fn start_build(&self) {
        *self.status.write() = BuildStatus::InProgress {
            started_at: Instant::now(),
        };
    }

    pub fn complete_build(&self, duration_ms: u64, failed_routes: usize) {
        *self.status.write() = BuildStatus::Success {
            duration_ms,
            failed_routes,
        };
    }

    pub fn fail_build(&self, error: String) {
        *self.status.write() = BuildStatus::Failed { error };
    }

    pub fn status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    /// Register a new SSE client.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    /// Send an event to every connected client.
    ///
    /// Never waits on a slow client: a full buffer drops the event for that
    /// client, a closed one is unregistered.
    pub fn broadcast(&self, event: &DevEvent) {
        let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());

        let mut closed = Vec::new();
        for (id, tx) in self.clients.read().iter() {
            if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(json.clone()) {
                closed.push(*id);
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.write();
            for id in closed {
                clients.remove(&id);
            }
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;
