//! Formatting for build summaries.

use archipel::BuildSummary;
use owo_colors::{OwoColorize, Stream::Stderr};
use std::path::PathBuf;

/// The block listing routes that were written as error documents.
///
/// Empty when nothing failed.
pub fn route_failure_block(failed_routes: &[PathBuf]) -> String {
    if failed_routes.is_empty() {
        return String::new();
    }

    let mut block = String::from("---\nFailed to build some routes:");
    for path in failed_routes {
        block.push('\n');
        block.push_str(&path.display().to_string());
    }
    block
}

/// Print the summary line and, if needed, the failure block.
pub fn print_build_summary(summary: &BuildSummary) {
    super::success(&summary.to_string());

    if !summary.failed_routes.is_empty() {
        let block = route_failure_block(&summary.failed_routes);
        eprintln!("{}", block.if_supports_color(Stderr, |s| s.yellow()));
    }

    for asset in &summary.failed_assets {
        super::warning(&format!("Could not copy {}", asset.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_failure_block() {
        let block = route_failure_block(&[
            PathBuf::from("build/index.html"),
            PathBuf::from("build/blog/post.html"),
        ]);
        assert_eq!(
            block,
            "---\nFailed to build some routes:\nbuild/index.html\nbuild/blog/post.html"
        );
    }

    #[test]
    fn test_route_failure_block_empty() {
        assert!(route_failure_block(&[]).is_empty());
    }
}
