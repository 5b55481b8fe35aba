//! Dev server configuration derived from [`ArchipelConfig`].

use crate::config::ArchipelConfig;
use crate::error::{ConfigError, Result};
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;

/// How many ports after the requested one are tried.
const PORT_FALLBACK_RANGE: u16 = 10;

/// Development server configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Server socket address (IP + port)
    pub addr: SocketAddr,

    /// Directory served to the browser
    pub out_dir: PathBuf,

    /// URL prefix everything is served under, e.g. `/docs/`
    pub base: String,
}

impl DevConfig {
    /// Resolve the dev server settings, falling back to a nearby port when
    /// the configured one is busy.
    pub fn from_config(config: &ArchipelConfig) -> Result<Self> {
        let options = config.build_options();
        Ok(Self {
            addr: find_available_port(config.port)?,
            out_dir: options.out_dir,
            base: options.base,
        })
    }

    /// URL of the site root.
    pub fn server_url(&self) -> String {
        format!("http://{}{}", self.addr, self.base)
    }
}

/// Find an available port starting from the requested port.
///
/// Tries the requested port first, then up to ten ports after it.
pub(crate) fn find_available_port(requested_port: u16) -> Result<SocketAddr> {
    let addr = SocketAddr::from(([127, 0, 0, 1], requested_port));
    if TcpListener::bind(addr).is_ok() {
        return Ok(addr);
    }

    for offset in 1..=PORT_FALLBACK_RANGE {
        let Some(port) = requested_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        if TcpListener::bind(addr).is_ok() {
            crate::ui::warning(&format!(
                "Port {requested_port} is busy, using port {port} instead"
            ));
            return Ok(addr);
        }
    }

    Err(ConfigError::InvalidValue {
        field: "port".to_string(),
        value: requested_port.to_string(),
        hint: format!(
            "Ports {}-{} are all in use. Try a different port.",
            requested_port,
            requested_port.saturating_add(PORT_FALLBACK_RANGE)
        ),
    }
    .into())
}
