//! `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images]
//! webp = true     # Write lossless .webp siblings for png/jpg/jpeg
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub webp: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { webp: true }
    }
}
