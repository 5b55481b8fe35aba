//! Server-side rendering of compiled page modules.

use std::fmt::Display;

use crate::dedup::dedupe_scripts;
use crate::toolchain::{CompiledModule, RawRenderOutput, RenderSandbox};

/// Prefix of every placeholder body written for a page that failed to render.
pub const FAILURE_MARKER: &str = "<!--archipel:failed-->";

/// Rendered page fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    pub html: String,
    pub head: String,
    pub css: String,
}

impl RenderResult {
    /// Placeholder for a page whose rendering failed with `error`.
    pub fn degraded(error: &dyn Display) -> Self {
        Self {
            html: format!(
                "{FAILURE_MARKER}<h1>ERROR</h1><pre>{}</pre>",
                escape_html(&error.to_string())
            ),
            head: String::new(),
            css: String::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.html.starts_with(FAILURE_MARKER)
    }
}

impl From<RawRenderOutput> for RenderResult {
    fn from(raw: RawRenderOutput) -> Self {
        Self {
            html: raw.html,
            head: raw.head,
            css: raw.css.map(|css| css.code).unwrap_or_default(),
        }
    }
}

/// Render one page module. Never fails: errors produce a degraded result.
pub async fn render_route(sandbox: &dyn RenderSandbox, module: &CompiledModule) -> RenderResult {
    match sandbox.render(module).await {
        Ok(raw) => {
            let mut result = RenderResult::from(raw);
            result.head = dedupe_scripts(&result.head);
            result
        }
        Err(e) => {
            tracing::warn!(module = %module.path.display(), error = %e, "page failed to render");
            RenderResult::degraded(&e)
        }
    }
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
