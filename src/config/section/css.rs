//! `[css]` section configuration.
//!
//! Browser targets for vendor prefixing of the production stylesheet.
//! Versions are major versions; leave a browser out to ignore it.
//!
//! # Example
//!
//! ```toml
//! [css]
//! minify = true               # Also write styles.min.css
//!
//! [css.browsers]
//! chrome = 110
//! safari = 15
//! ```

use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// Write a minified sibling next to the production stylesheet.
    pub minify: bool,
    pub browsers: BrowserTargets,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            minify: true,
            browsers: BrowserTargets::default(),
        }
    }
}

/// Oldest supported major version per browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserTargets {
    pub chrome: Option<u32>,
    pub edge: Option<u32>,
    pub firefox: Option<u32>,
    pub safari: Option<u32>,
    pub ios_saf: Option<u32>,
    pub samsung: Option<u32>,
}

impl Default for BrowserTargets {
    fn default() -> Self {
        Self {
            chrome: Some(109),
            edge: Some(109),
            firefox: Some(115),
            safari: Some(15),
            ios_saf: Some(15),
            samsung: Some(20),
        }
    }
}

impl BrowserTargets {
    /// Encode as lightningcss targets (`major << 16`).
    pub fn to_browsers(&self) -> Browsers {
        let version = |v: Option<u32>| v.map(|major| major << 16);
        Browsers {
            chrome: version(self.chrome),
            edge: version(self.edge),
            firefox: version(self.firefox),
            safari: version(self.safari),
            ios_saf: version(self.ios_saf),
            samsung: version(self.samsung),
            ..Browsers::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_css_defaults() {
        let config = test_parse_config("");
        assert!(config.css.minify);
        assert_eq!(config.css.browsers.to_browsers().safari, Some(15 << 16));
    }

    #[test]
    fn test_css_browsers_override() {
        let config = test_parse_config("[css.browsers]\nchrome = 90\nsafari = 12");
        let browsers = config.css.browsers.to_browsers();
        assert_eq!(browsers.chrome, Some(90 << 16));
        assert_eq!(browsers.safari, Some(12 << 16));
        // unspecified browsers keep their defaults
        assert_eq!(browsers.firefox, Some(115 << 16));
    }
}
