//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! debounce_ms = 300      # Quiet period before a batch of changes is handled
//! max_concurrent = 4     # Bindings allowed to rebuild at the same time
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
    pub max_concurrent: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_concurrent: 4,
        }
    }
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::time::Duration;

    #[test]
    fn test_watch_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.debounce(), Duration::from_millis(300));
        assert_eq!(config.watch.max_concurrent, 4);
    }

    #[test]
    fn test_watch_override() {
        let config = test_parse_config("[watch]\ndebounce_ms = 50\nmax_concurrent = 1");
        assert_eq!(config.watch.debounce_ms, 50);
        assert_eq!(config.watch.max_concurrent, 1);
    }
}
