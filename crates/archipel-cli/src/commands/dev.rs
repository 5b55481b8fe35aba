//! Dev command implementation.
//!
//! 1. Initial clean build
//! 2. HTTP server with SSE live reload
//! 3. File watcher over the content directory
//! 4. Debounced rebuilds until Ctrl+C

use crate::cli::DevArgs;
use crate::commands::toolchain_from_config;
use crate::config::ArchipelConfig;
use crate::dev::{self, DevConfig, DevEvent, DevServer, DevServerState, FileWatcher, SharedState};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use archipel::Builder;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

/// Execute the dev command.
pub async fn execute(args: DevArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ArchipelConfig::load(config_path, &args.overrides())?;
    config.validate()?;
    run(config).await
}

/// Run watch mode with an already loaded configuration.
pub async fn run(config: ArchipelConfig) -> Result<()> {
    let options = config.build_options();
    let toolchain = toolchain_from_config(&config)?;
    let dev_config = DevConfig::from_config(&config)?;

    let state: SharedState = Arc::new(DevServerState::new(
        dev_config.out_dir.clone(),
        dev_config.base.clone(),
    ));
    let builder = Arc::new(Builder::new(options.clone(), toolchain));

    // A failed initial build is shown in the browser like any other
    ui::info("Performing initial build...");
    rebuild(Arc::clone(&builder), Arc::clone(&state)).await;

    let server = DevServer::new(dev_config, Arc::clone(&state));
    let mut server_handle = tokio::spawn(server.start());

    let (watcher, changes) = match FileWatcher::new(&options.content_dir, &options.out_dir)
        .with_hint("Create the content directory or point --content-dir at it")
    {
        Ok(watching) => watching,
        Err(e) => {
            server_handle.abort();
            return Err(e);
        }
    };
    ui::info(&format!(
        "Watching for changes in: {}",
        watcher.root().display()
    ));

    ui::info("Press Ctrl+C to stop");

    let mut server_error = None;
    let shutdown = async {
        tokio::select! {
            _ = signal::ctrl_c() => ui::info("Shutting down development server..."),
            result = &mut server_handle => {
                server_error = Some(match result {
                    Ok(Err(e)) => e,
                    Ok(Ok(())) => CliError::Server("Server stopped unexpectedly".to_string()),
                    Err(e) => CliError::Server(format!("Server task failed: {e}")),
                });
            }
        }
    };

    dev::drive(changes, config.debounce(), shutdown, || {
        rebuild(Arc::clone(&builder), Arc::clone(&state))
    })
    .await;

    server_handle.abort();
    drop(watcher);

    if let Some(error) = server_error {
        return Err(error);
    }

    ui::success("Development server stopped");
    Ok(())
}

/// One rebuild: update the status, report, and notify browsers.
async fn rebuild(builder: Arc<Builder>, state: SharedState) {
    state.start_build();
    state.broadcast(&DevEvent::BuildStarted);

    match builder.build().await {
        Ok(summary) => {
            let duration_ms = u64::try_from(summary.elapsed_ms()).unwrap_or(u64::MAX);
            let failed_routes = summary.failed_routes.len();
            state.complete_build(duration_ms, failed_routes);
            ui::print_build_summary(&summary);
            state.broadcast(&DevEvent::BuildCompleted {
                duration_ms,
                failed_routes,
            });
        }
        Err(e) => {
            let error = e.to_string();
            ui::error(&format!("Build failed: {error}"));
            state.fail_build(error.clone());
            state.broadcast(&DevEvent::BuildFailed { error });
        }
    }
}
