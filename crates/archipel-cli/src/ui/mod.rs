//! Terminal status output.
//!
//! Everything here writes to stderr so that stdout stays free for piping.
//!
//! ```no_run
//! use archipel_cli::ui;
//!
//! ui::init_colors(false);
//! ui::info("Watching _site/");
//! ui::success("Built 12 routes in 84ms");
//! ```

mod format;
mod messages;

pub use format::{print_build_summary, route_failure_block};
pub use messages::{error, info, success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment and `--no-color`.
pub fn init_colors(no_color: bool) {
    owo_colors::set_override(!no_color && should_use_color());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_colors() {
        init_colors(true);
        success("plain");
    }
}
