//! `[serve]` section configuration.
//!
//! Contains development server and live-reload settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 3000                 # HTTP port for the output tree
//! ws_port = 35729             # WebSocket port for live reload
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.
//! Both ports move to the next free port when busy.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port for reload notifications.
    pub ws_port: u16,

    /// Serve the output tree during `watch`.
    pub enable: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            ws_port: 35729,
            enable: true,
        }
    }
}
