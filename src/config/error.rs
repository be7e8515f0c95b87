//! Errors raised while loading `kiln.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid kiln.toml")]
    Toml(#[from] toml::de::Error),

    /// Only raised for an explicit `-C` path; the default name falls back to
    /// built-in settings.
    #[error("config file `{}` not found", .0.display())]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
