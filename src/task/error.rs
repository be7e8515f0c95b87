//! Leaf task failure taxonomy.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a leaf transform failed.
///
/// Every variant is recoverable from the orchestrator's point of view:
/// the failing leaf is recorded in the report and the run continues
/// according to the composition rules.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The transform (or the tool it delegates to) reported an error.
    #[error("{0}")]
    Transform(String),

    /// An external program is not installed or not on PATH.
    #[error("`{0}` not found on PATH")]
    ToolMissing(String),

    /// Reading an input or writing an output failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transform panicked.
    #[error("panicked: {0}")]
    Panicked(String),

    /// A declared input pattern is not a valid glob.
    #[error("invalid input pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl TaskError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform(message.into())
    }
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = TaskError::io(
            "build/css/styles.css",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("build/css/styles.css"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(owned.as_ref()), "owned boom");

        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
