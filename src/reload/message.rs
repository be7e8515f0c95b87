//! Reload message protocol.
//!
//! JSON objects tagged by `type`:
//!
//! - `reload`: reload the whole page
//! - `css`: re-fetch one stylesheet in place
//! - `error`: a task failed; show it, keep the page
//! - `connected`: greeting sent once per viewer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Reload,

    Css {
        /// Stylesheet path relative to the output root, `/`-separated.
        path: String,
    },

    Error {
        task: String,
        message: String,
    },

    Connected {
        /// Server version for compatibility check
        version: String,
    },
}

impl ReloadMessage {
    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    pub fn error(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            task: task.into(),
            message: message.into(),
        }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_json() {
        assert_eq!(ReloadMessage::Reload.to_json(), r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_css_json() {
        assert_eq!(
            ReloadMessage::css("css/styles.css").to_json(),
            r#"{"type":"css","path":"css/styles.css"}"#
        );
    }

    #[test]
    fn test_error_json() {
        let json = ReloadMessage::error("css:dev", "Expected \";\"").to_json();
        assert!(json.starts_with(r#"{"type":"error","task":"css:dev""#));
        assert_eq!(
            ReloadMessage::from_json(&json),
            Some(ReloadMessage::error("css:dev", "Expected \";\""))
        );
    }

    #[test]
    fn test_connected_carries_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert_eq!(ReloadMessage::from_json(r#"{"type":"patch"}"#), None);
    }
}
