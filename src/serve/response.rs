//! HTTP response handlers.

use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars, script_tag};
use crate::utils::mime::{self, types};
use anyhow::{Context, Result};
use std::io::Read;
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a static file, injecting the reload client into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_hotreload(body, content_type, ws_port);
    send_body(request, 200, content_type, body)
}

/// Respond with 404 page (custom `404.html` or plain text).
pub fn respond_not_found(request: Request, output: &Path, ws_port: Option<u16>) -> Result<()> {
    let custom_404 = output.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let mime = if has_custom { types::HTML } else { types::PLAIN };
        return send_head(request, 404, mime);
    }

    if has_custom && let Ok(body) = fs::read(&custom_404) {
        let body = maybe_inject_hotreload(body, types::HTML, ws_port);
        return send_body(request, 404, types::HTML, body);
    }

    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the reload client.
pub fn respond_hotreload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = HOTRELOAD_JS.render(&HotreloadVars { ws_port });
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

/// Inject the reload client if content is HTML and live reload is on
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(_)) => inject_hotreload_script(&body),
        _ => body,
    }
}

/// Insert the client before the last `</body>`, or append it.
fn inject_hotreload_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = script_tag();
    let script = script.as_bytes();
    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &str) -> Result<()> {
    finish(request, Response::empty(StatusCode(status)), content_type)
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body).with_status_code(StatusCode(status));
    finish(request, response, content_type)
}

fn finish<R: Read>(request: Request, mut response: Response<R>, content_type: &str) -> Result<()> {
    for (key, value) in [("Content-Type", content_type), ("Cache-Control", "no-store")] {
        let header = Header::from_bytes(key, value)
            .map_err(|()| anyhow::anyhow!("invalid header {key}: {value}"))?;
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}
