//! WebSocket listener for reload viewers.

use super::ReloadNotifier;
use anyhow::{Context, Result};
use std::net::{IpAddr, TcpListener};
use std::time::Duration;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Handshake must finish within this time.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// A viewer that cannot take a frame within this time is dropped.
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Start accepting viewers on `interface`, from `base_port` upward.
///
/// Returns the port actually bound.
pub fn start(interface: IpAddr, base_port: u16, notifier: ReloadNotifier) -> Result<u16> {
    let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;

    std::thread::Builder::new()
        .name("kiln-reload".into())
        .spawn(move || accept_loop(listener, notifier))
        .context("failed to spawn reload listener")?;

    Ok(port)
}

fn accept_loop(listener: TcpListener, notifier: ReloadNotifier) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                crate::log!("reload"; "accept error: {}", e);
                std::thread::sleep(Duration::from_millis(100));
                continue;
            }
        };

        if let Ok(addr) = stream.peer_addr() {
            crate::debug!("reload"; "client connected: {}", addr);
        }
        let _ = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT));

        match tungstenite::accept(stream) {
            Ok(ws) => {
                let _ = ws.get_ref().set_read_timeout(None);
                let _ = ws.get_ref().set_write_timeout(Some(WRITE_TIMEOUT));
                notifier.connect(Box::new(ws));
            }
            Err(e) => crate::log!("reload"; "handshake failed: {}", e),
        }
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::ReloadMessage;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_busy_port_moves_on() {
        let (held, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        let (_next, next_port) = try_bind_port(LOCALHOST, port, MAX_PORT_RETRIES).unwrap();
        assert_ne!(next_port, port);
        drop(held);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_viewer_receives_greeting_then_events() {
        let notifier = ReloadNotifier::new();
        let port = start(LOCALHOST, 0, notifier.clone()).unwrap();

        let (mut socket, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        let greeting = socket.read().unwrap().into_text().unwrap();
        assert!(greeting.contains(r#""type":"connected""#));

        assert_eq!(notifier.publish(vec![ReloadMessage::Reload]).await, 1);
        let frame = socket.read().unwrap().into_text().unwrap();
        assert_eq!(frame.as_str(), r#"{"type":"reload"}"#);
    }
}
