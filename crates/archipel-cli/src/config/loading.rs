use crate::config::{ArchipelConfig, ConfigOverrides};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use std::path::Path;

/// Config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "archipel.config.json";

/// Prefix of the environment variables read as configuration.
pub const ENV_PREFIX: &str = "ARCHIPEL_";

/// Environment keys (after the prefix) that map onto config fields.
const ENV_KEYS: &[&str] = &[
    "base",
    "out_dir",
    "content_dir",
    "minify",
    "watch",
    "port",
    "debounce_ms",
    "toolchain",
    "toolchain_timeout_ms",
    "render_concurrency",
    "format_html",
    "strict",
];

impl ArchipelConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI overrides > environment variables > config file > defaults
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        Self::figment(config_path, overrides)?
            .extract()
            .map_err(|e| {
                ConfigError::InvalidValue {
                    field: "configuration".to_string(),
                    value: e.to_string(),
                    hint: format!("Check {CONFIG_FILE_NAME} syntax and field types"),
                }
                .into()
            })
    }

    fn figment(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        // An explicit --config must exist; the default file is optional
        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        // ARCHIPEL_OUT_DIR -> outDir, and so on
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .only(ENV_KEYS)
                .map(|key| env_key_to_field(key.as_str()).into())
                .lowercase(false),
        );

        Ok(figment.merge(Serialized::defaults(overrides)))
    }
}

/// `DEBOUNCE_MS` -> `debounceMs`
pub(crate) fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            field.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }
    field
}
