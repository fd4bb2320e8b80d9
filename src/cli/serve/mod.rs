//! Development server: a shell page hosting the live preview in a
//! sandboxed iframe, kept current over WebSocket.
//!
//! ```text
//! GET /            shell page (iframe sandbox="allow-scripts")
//! GET /blob/<id>   rendered document; 404 once revoked
//! ws://…:<port>    {"type":"navigate","url":"/blob/<id>"}
//! ```

mod lifecycle;
mod response;

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Method, Request, Server};

use crate::config::RawSettings;
use crate::core::{register_server, register_shutdown};
use crate::embed::serve::{ShellVars, shell_html};
use crate::reload::{ClientHub, start_ws_server};
use crate::surface::{BlobStore, BlobSurface, blob};
use crate::{debug, log};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5277;

/// Default WebSocket port for live navigation
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Number of request worker threads
const REQUEST_WORKERS: usize = 4;

/// State shared by request workers.
struct ServeState {
    store: Arc<BlobStore>,
    title: String,
    ws_port: u16,
}

/// Serve a live preview of `file` until Ctrl+C.
pub fn serve_file(
    file: &Path,
    interface: IpAddr,
    port: u16,
    config: &Path,
    overrides: RawSettings,
) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(interface, port)?;
    let server = Arc::new(server);

    let hub = Arc::new(ClientHub::new());
    let ws_port = start_ws_server(&interface.to_string(), DEFAULT_WS_PORT, Arc::clone(&hub))?;
    debug!("reload"; "ws://{}:{}", interface, ws_port);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_shutdown(shutdown_tx);
    register_server(Arc::clone(&server));

    let store = Arc::new(BlobStore::new());
    let surface = BlobSurface::new(Arc::clone(&store), hub);
    let preview = lifecycle::spawn_preview(
        file.to_path_buf(),
        config.to_path_buf(),
        overrides,
        surface,
        shutdown_rx,
    );

    let state = Arc::new(ServeState {
        store,
        title: file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "fenceplay".to_string()),
        ws_port,
    });

    log!("serve"; "http://{}", display_addr(addr));
    run_request_loop(&server, &state)?;
    lifecycle::wait_for_shutdown(preview);
    Ok(())
}

/// Loopback-friendly address for the startup banner.
fn display_addr(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("localhost:{}", addr.port())
    } else {
        addr.to_string()
    }
}

fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_WORKERS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    let path = request.url().split(['?', '#']).next().unwrap_or("/").to_string();
    debug!("serve"; "{} {}", request.method(), path);

    if path == "/" || path == "/index.html" {
        let src = state
            .store
            .active()
            .map(|blob| blob.url())
            .unwrap_or_else(|| "about:blank".to_string());
        let body = shell_html().render(&ShellVars {
            title: &state.title,
            src: &src,
            ws_port: state.ws_port,
        });
        return response::respond_shell(request, body);
    }

    match blob::parse_url(&path).and_then(|id| state.store.get(id)) {
        Some(blob) => response::respond_blob(request, &blob),
        None => response::respond_not_found(request),
    }
}
