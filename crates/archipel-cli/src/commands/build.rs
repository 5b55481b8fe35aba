//! Build command implementation.

use crate::cli::BuildArgs;
use crate::commands::{dev, toolchain_from_config};
use crate::config::ArchipelConfig;
use crate::error::{CliError, Result};
use crate::ui;
use archipel::{BuildSummary, Builder, Toolchain};
use std::path::Path;

/// Execute the build command.
///
/// 1. Load and validate configuration (CLI > Env > File > Defaults)
/// 2. Hand over to watch mode when `watch` is set
/// 3. Run one build cycle and print the summary
/// 4. Fail when `strict` is set and routes were degraded
pub async fn execute(args: BuildArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ArchipelConfig::load(config_path, &args.overrides())?;
    config.validate()?;

    if config.watch {
        return dev::run(config).await;
    }

    let toolchain = toolchain_from_config(&config)?;
    let summary = run_build(&config, toolchain).await?;
    ui::print_build_summary(&summary);

    check_strict(&config, &summary)
}

/// Run one full build cycle.
pub async fn run_build(config: &ArchipelConfig, toolchain: Toolchain) -> Result<BuildSummary> {
    let options = config.build_options();
    if !options.content_dir.exists() {
        ui::warning(&format!(
            "Content directory {} does not exist",
            options.content_dir.display()
        ));
    }

    let builder = Builder::new(options, toolchain);
    Ok(builder.build().await?)
}

/// Turn degraded routes into an error when `strict` is set.
pub fn check_strict(config: &ArchipelConfig, summary: &BuildSummary) -> Result<()> {
    if config.strict && !summary.failed_routes.is_empty() {
        return Err(CliError::RoutesFailed {
            count: summary.failed_routes.len(),
        });
    }
    Ok(())
}
