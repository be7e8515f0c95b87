//! Live reload for connected viewers.
//!
//! ```text
//! WatchSession ──ReloadEvent──► ReloadNotifier ──json──► viewers (WebSocket)
//!                                     ▲
//!                     server::start ──┘ (accept + handshake)
//! ```
//!
//! Delivery is best-effort and there is no backlog: a viewer only sees the
//! events sent after it connected.

pub mod message;
mod notifier;
pub mod server;

pub use message::ReloadMessage;
pub use notifier::{ReloadEvent, ReloadNotifier};

#[cfg(test)]
pub(crate) use notifier::testing;
