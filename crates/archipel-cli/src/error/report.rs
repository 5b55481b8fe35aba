//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use archipel::{Pass, ToolchainError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Toolchain(e) => toolchain_error_to_miette(e),
        CliError::RoutesFailed { count } => miette::miette!(
            help = "The failed routes were written as error documents; run with --verbose for details",
            "{} route(s) failed to render",
            count
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a fatal library error to miette Report
pub fn build_error_to_miette(err: archipel::Error) -> Report {
    match err {
        archipel::Error::Bundle { pass, source } => {
            let help = match pass {
                Pass::Pages => "Every page is compiled in one bundler call; check the page sources",
                Pass::Islands => "Check the island components under components/",
            };
            miette::miette!(help = help, "{} pass failed: {}", pass, source)
        }
        archipel::Error::InvalidOptions(msg) => miette::miette!(
            help = "Use an output directory outside the content directory",
            "Invalid build options: {}",
            msg
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a toolchain setup error to miette Report
pub fn toolchain_error_to_miette(err: ToolchainError) -> Report {
    match err {
        ToolchainError::Spawn { program, source } => miette::miette!(
            help = "Install the toolchain or point `toolchain` at it, e.g. --toolchain \"node toolchain/archipel-toolchain.mjs\"",
            "Failed to spawn toolchain `{}`: {}",
            program,
            source
        ),
        _ => miette::miette!("Toolchain error: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_failed_has_help() {
        let report = cli_error_to_miette(CliError::RoutesFailed { count: 3 });
        assert!(report.to_string().contains("3 route(s)"));
        assert!(report.help().is_some());
    }

    #[test]
    fn test_bundle_error_mentions_pass() {
        let report = cli_error_to_miette(CliError::Build(archipel::Error::Bundle {
            pass: Pass::Islands,
            source: ToolchainError::InvalidResponse("not json".to_string()),
        }));
        assert!(report.to_string().starts_with("island pass failed"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let report = cli_error_to_miette(CliError::Server("address in use".to_string()));
        assert_eq!(report.to_string(), "Server error: address in use");
    }
}
