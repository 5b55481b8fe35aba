use crate::config::ArchipelConfig;
use crate::error::{ConfigError, Result};

/// Largest accepted debounce window.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

impl ArchipelConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Use a port between 1 and 65535".to_string(),
            }
            .into());
        }

        if !(1..=MAX_DEBOUNCE_MS).contains(&self.debounce_ms) {
            return Err(ConfigError::InvalidValue {
                field: "debounceMs".to_string(),
                value: self.debounce_ms.to_string(),
                hint: format!("Debounce window must be between 1 and {MAX_DEBOUNCE_MS} ms"),
            }
            .into());
        }

        if self.toolchain.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::MissingField {
                field: "toolchain".to_string(),
                hint: "Provide the toolchain program, e.g. [\"node\", \"toolchain/archipel-toolchain.mjs\"]"
                    .to_string(),
            }
            .into());
        }

        if self.render_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "renderConcurrency".to_string(),
                value: "0".to_string(),
                hint: "At least one toolchain process must be allowed".to_string(),
            }
            .into());
        }

        if self.toolchain_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "toolchainTimeoutMs".to_string(),
                value: "0".to_string(),
                hint: "Timeout must be at least 1 ms".to_string(),
            }
            .into());
        }

        self.build_options().validate().map_err(|e| {
            ConfigError::InvalidValue {
                field: "outDir".to_string(),
                value: self.out_dir.display().to_string(),
                hint: e.to_string(),
            }
            .into()
        })
    }
}
