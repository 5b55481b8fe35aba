//! Development server with live reload via Server-Sent Events.
//!
//! Serves the output directory with `ServeDir` under the `base` prefix and
//! pushes build events to connected browsers.

use crate::dev::{DevConfig, DevEvent, SharedState, error_page};
use crate::error::{CliError, Result};
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower::util::MapRequest;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::debug;

/// SSE endpoint browsers subscribe to.
pub const SSE_PATH: &str = "/__archipel_sse__";

/// Live reload client script.
pub const RELOAD_SCRIPT_PATH: &str = "/__archipel_reload__.js";

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");

/// Development server.
pub struct DevServer {
    config: DevConfig,
    state: SharedState,
}

impl DevServer {
    pub fn new(config: DevConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Bind the configured address and serve until the task is dropped.
    pub async fn start(self) -> Result<()> {
        let addr = self.config.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {addr}: {e}")))?;

        crate::ui::success(&format!(
            "Development server running at {}",
            self.config.server_url()
        ));

        serve(listener, self.state).await
    }
}

/// Serve the dev routes on an already bound listener.
pub async fn serve(listener: TcpListener, state: SharedState) -> Result<()> {
    axum::serve(listener, router(state))
        .await
        .map_err(|e| CliError::Server(e.to_string()))
}

/// Build the axum router with all routes.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(SSE_PATH, get(handle_sse))
        .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
        .with_state(Arc::clone(&state))
        .merge(site_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    debug!(client = id, "SSE client connected");

    state.broadcast(&DevEvent::ClientConnected { id });

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

/// Serve the output directory under `base`.
///
/// Missing paths are retried as `<path>.html` so routes work without their
/// extension. The live-reload layer wraps everything served from disk.
fn site_router(state: SharedState) -> Router {
    let html_routes = MapRequest::new(
        ServeDir::new(state.out_dir()),
        with_html_extension as fn(Request) -> Request,
    );
    let files = ServeDir::new(state.out_dir())
        .append_index_html_on_directories(true)
        .fallback(html_routes);

    let prefix = state.base().trim_end_matches('/');
    let router = if prefix.is_empty() {
        Router::new().fallback_service(files)
    } else {
        Router::new()
            .nest_service(prefix, files)
            .fallback(not_found)
    };

    router.layer(middleware::from_fn_with_state(state, live_reload))
}

/// Show the error page while the last build is failed, keep redirects under
/// `base` and add the reload client to HTML responses.
async fn live_reload(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    if let Some(error) = state.status().error() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            error_page::error_page(error),
        )
            .into_response();
    }

    let mut response = next.run(request).await;
    prefix_redirect(&mut response, state.base());

    if !is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "failed to read html response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_reload_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Response::from_parts(parts, Body::from(html))
}

/// `/blog/post` -> `/blog/post.html`; directory paths are left alone.
fn with_html_extension(mut request: Request) -> Request {
    let uri = request.uri();
    let path = uri.path();
    if path.ends_with('/') {
        return request;
    }

    let rewritten = match uri.query() {
        Some(query) => format!("{path}.html?{query}"),
        None => format!("{path}.html"),
    };
    if let Ok(uri) = rewritten.parse::<Uri>() {
        *request.uri_mut() = uri;
    }
    request
}

/// Directory redirects are built from the nested path, without the prefix.
fn prefix_redirect(response: &mut Response, base: &str) {
    let prefix = base.trim_end_matches('/');
    if prefix.is_empty() || !response.status().is_redirection() {
        return;
    }

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .filter(|location| location.starts_with('/'))
        .and_then(|location| HeaderValue::from_str(&format!("{prefix}{location}")).ok());

    if let Some(location) = location {
        response.headers_mut().insert(header::LOCATION, location);
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"))
}

async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("File not found: {}", uri.path()),
    )
        .into_response()
}

/// Add the reload client before the closing `</body>` tag, or at the end.
pub(crate) fn inject_reload_script(html: &str) -> String {
    let script_tag = format!(r#"<script src="{RELOAD_SCRIPT_PATH}"></script>"#);

    match html.rfind("</body>") {
        Some(pos) => {
            let mut result = String::with_capacity(html.len() + script_tag.len() + 1);
            result.push_str(&html[..pos]);
            result.push_str(&script_tag);
            result.push('\n');
            result.push_str(&html[pos..]);
            result
        }
        None => format!("{html}\n{script_tag}"),
    }
}
