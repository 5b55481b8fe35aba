//! Toolchain backed by an external command.
//!
//! Every call spawns `<program> <args..> <action>` where action is `bundle`,
//! `render` or `format`. The request goes to stdin, the response comes back
//! on stdout:
//!
//! | action   | stdin                   | stdout                          |
//! |----------|-------------------------|---------------------------------|
//! | `bundle` | [`BundleRequest`] JSON  | [`BundleOutput`] JSON (or empty when writing) |
//! | `render` | compiled module text    | `{ html, head, css? }` JSON     |
//! | `format` | HTML document           | formatted HTML                  |
//!
//! A non-zero exit is an error carrying stderr. Each call is bounded by a
//! timeout and the number of concurrent children by a semaphore.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::{
    BundleOutput, BundleRequest, Bundler, CompiledModule, HtmlFormatter, RawRenderOutput,
    RenderError, RenderSandbox, ToolchainError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Bundle,
    Render,
    Format,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::Bundle => "bundle",
            Action::Render => "render",
            Action::Format => "format",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessToolchain {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl ProcessToolchain {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_CONCURRENCY: usize = 8;

    /// Create a toolchain from a command line (`program` followed by fixed args).
    pub fn new(command: &[String]) -> Result<Self, ToolchainError> {
        let (program, args) = command.split_first().ok_or(ToolchainError::EmptyCommand)?;
        if program.trim().is_empty() {
            return Err(ToolchainError::EmptyCommand);
        }

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: Self::DEFAULT_TIMEOUT,
            permits: Arc::new(Semaphore::new(Self::DEFAULT_CONCURRENCY)),
        })
    }

    /// Per-call timeout. The child is killed when it elapses.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of toolchain processes alive at once (at least 1).
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    fn describe(&self, action: Action) -> String {
        format!("{} {}", self.program, action.as_str())
    }

    async fn run(&self, action: Action, input: Vec<u8>) -> Result<Vec<u8>, ToolchainError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ToolchainError::Unavailable(e.to_string()))?;

        let command = self.describe(action);
        tracing::debug!(%command, bytes = input.len(), "running toolchain");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(action.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolchainError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolchainError::Unavailable("stdin not captured".to_string()))?;

        // Feed stdin while collecting output so a chatty child cannot block on a full pipe.
        let feed = async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            match result {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };

        let run = async move {
            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            fed?;
            output
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| ToolchainError::Timeout {
                command: command.clone(),
                timeout: self.timeout,
            })??;

        if !output.status.success() {
            return Err(ToolchainError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Bundler for ProcessToolchain {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, ToolchainError> {
        let input = serde_json::to_vec(request)
            .map_err(|e| ToolchainError::InvalidResponse(format!("unserializable request: {e}")))?;
        let stdout = self.run(Action::Bundle, input).await?;

        if stdout.iter().all(u8::is_ascii_whitespace) {
            return if request.write {
                Ok(BundleOutput::default())
            } else {
                Err(ToolchainError::InvalidResponse(
                    "bundler returned no output files".to_string(),
                ))
            };
        }

        serde_json::from_slice(&stdout).map_err(|e| ToolchainError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RenderSandbox for ProcessToolchain {
    async fn render(&self, module: &CompiledModule) -> Result<RawRenderOutput, RenderError> {
        let stdout = match self.run(Action::Render, module.text.clone().into_bytes()).await {
            Ok(stdout) => stdout,
            Err(ToolchainError::Failed { stderr, .. }) => return Err(RenderError::Evaluation(stderr)),
            Err(e) => return Err(e.into()),
        };

        let text = String::from_utf8(stdout).map_err(|e| RenderError::Shape(e.to_string()))?;
        RawRenderOutput::from_json(&text)
    }
}

#[async_trait]
impl HtmlFormatter for ProcessToolchain {
    async fn format(&self, html: &str) -> Result<String, ToolchainError> {
        let stdout = self.run(Action::Format, html.as_bytes().to_vec()).await?;
        String::from_utf8(stdout).map_err(|e| ToolchainError::InvalidResponse(e.to_string()))
    }
}
