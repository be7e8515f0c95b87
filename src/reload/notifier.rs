//! Broadcast of reload events to connected viewers.

use super::ReloadMessage;
use parking_lot::Mutex;
use std::net::TcpStream;
use std::sync::Arc;
use tungstenite::{Message, WebSocket};

/// What a finished watch run asks viewers to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    FullReload,
    /// Re-fetch one stylesheet, given relative to the output root.
    StyleInject(String),
}

impl From<&ReloadEvent> for ReloadMessage {
    fn from(event: &ReloadEvent) -> Self {
        match event {
            ReloadEvent::FullReload => Self::Reload,
            ReloadEvent::StyleInject(path) => Self::css(path.clone()),
        }
    }
}

/// One connected viewer.
pub trait Viewer: Send {
    /// Deliver one text frame. An error drops the viewer.
    fn send_text(&mut self, text: &str) -> Result<(), String>;
}

impl Viewer for WebSocket<TcpStream> {
    fn send_text(&mut self, text: &str) -> Result<(), String> {
        self.send(Message::Text(text.to_owned().into()))
            .map_err(|e| e.to_string())
    }
}

/// Shared handle over the set of connected viewers.
#[derive(Clone, Default)]
pub struct ReloadNotifier {
    viewers: Arc<Mutex<Vec<Box<dyn Viewer>>>>,
}

impl ReloadNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Greet and register a viewer. Returns false if the greeting failed.
    ///
    /// The lock is held across greeting and registration, so a viewer never
    /// sees an event that was sent before its greeting.
    pub fn connect(&self, mut viewer: Box<dyn Viewer>) -> bool {
        let mut viewers = self.viewers.lock();
        if let Err(e) = viewer.send_text(&ReloadMessage::connected().to_json()) {
            crate::debug!("reload"; "greeting failed: {}", e);
            return false;
        }
        viewers.push(viewer);
        crate::debug!("reload"; "viewer connected (total: {})", viewers.len());
        true
    }

    /// Send `messages` in order on a blocking thread.
    ///
    /// Socket writes block, so they never run on the async runtime. Returns
    /// how many viewers received the last message.
    pub async fn publish(&self, messages: Vec<ReloadMessage>) -> usize {
        let notifier = self.clone();
        let delivery = tokio::task::spawn_blocking(move || {
            messages.iter().fold(0, |_, message| notifier.broadcast(message))
        });
        match delivery.await {
            Ok(received) => received,
            Err(e) => {
                crate::log!("reload"; "delivery failed: {}", e);
                0
            }
        }
    }

    /// Send to every viewer, dropping those whose send fails.
    ///
    /// Returns how many viewers received the message.
    pub fn broadcast(&self, message: &ReloadMessage) -> usize {
        let text = message.to_json();
        let mut viewers = self.viewers.lock();
        viewers.retain_mut(|viewer| match viewer.send_text(&text) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("reload"; "dropping viewer: {}", e);
                false
            }
        });
        viewers.len()
    }

    #[cfg(test)]
    pub fn viewer_count(&self) -> usize {
        self.viewers.lock().len()
    }
}
