//! Development server for the output tree.
//!
//! Static files only; HTML responses get the live-reload client injected
//! when a reload port is known.

mod path;
mod response;

use crate::config::ServeConfig;
use crate::embed::serve::HOTRELOAD_URL;
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Threads answering requests.
const WORKERS: usize = 4;

/// A bound server whose workers are already running.
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

impl DevServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared handle, for unblocking on shutdown.
    pub fn handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }
}

/// Bind and start serving `output`.
pub fn start(config: &ServeConfig, output: PathBuf, ws_port: Option<u16>) -> Result<DevServer> {
    let (server, addr) = bind_with_retry(config.interface, config.port)?;
    let server = Arc::new(server);

    for worker in 0..WORKERS {
        let server = Arc::clone(&server);
        let output = output.clone();
        std::thread::Builder::new()
            .name(format!("kiln-http-{worker}"))
            .spawn(move || serve_loop(&server, &output, ws_port))
            .context("failed to spawn http worker")?;
    }

    crate::log!("serve"; "http://{}", addr);
    Ok(DevServer { server, addr })
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = String::new();

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match Server::http(SocketAddr::new(interface, port)) {
            Ok(server) => {
                if offset > 0 {
                    crate::log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server
                    .server_addr()
                    .to_ip()
                    .unwrap_or_else(|| SocketAddr::new(interface, port));
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error
    ))
}

fn serve_loop(server: &Server, output: &Path, ws_port: Option<u16>) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, output, ws_port) {
            crate::log!("serve"; "request error: {e}");
        }
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, output: &Path, ws_port: Option<u16>) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if let Some(port) = ws_port
        && request.url() == HOTRELOAD_URL
    {
        return response::respond_hotreload_js(request, port);
    }

    match path::resolve_path(request.url(), output) {
        Some(path) => response::respond_file(request, &path, ws_port),
        None => response::respond_not_found(request, output, ws_port),
    }
}
