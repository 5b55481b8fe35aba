//! Page served in place of the site while the last rebuild failed.
//!
//! It listens on the SSE endpoint and reloads once a later build succeeds.

use crate::dev::server::{RELOAD_SCRIPT_PATH, SSE_PATH};
use archipel::escape_html;

/// Render the error page for a fatal build error.
pub fn error_page(error: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="utf-8">
	<title>Build Error</title>
	<style>
		body {{ margin: 0; padding: 2rem; background: #1e1e1e; color: #f5f5f5; font-family: ui-monospace, monospace; }}
		h1 {{ color: #ff6b6b; font-size: 1.25rem; }}
		pre {{ white-space: pre-wrap; background: #2b2b2b; padding: 1rem; border-left: 4px solid #ff6b6b; }}
		p {{ color: #9a9a9a; }}
	</style>
</head>
<body>
	<h1>Build Error</h1>
	<pre>{error}</pre>
	<p>Fix the error and save; this page reloads after the next successful build ({sse}).</p>
	<script src="{script}"></script>
</body>
</html>
"#,
        error = escape_html(error),
        sse = SSE_PATH,
        script = RELOAD_SCRIPT_PATH,
    )
}
