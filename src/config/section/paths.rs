//! `[paths]` section configuration.
//!
//! Source and output layout, relative to the project root.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "src"       # Markup, scss, js, img, icons, fonts, resources
//! output = "build"     # Deployable output tree (emptied by every profile run)
//! style_entry = "scss/styles.scss"
//! font_manifest = "scss/.kiln/_font-families.scss"
//! sprite_styles = "scss/.kiln/_sprite.scss"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source tree.
    pub source: PathBuf,
    /// Output tree.
    pub output: PathBuf,
    /// Stylesheet entry point, relative to `source`.
    pub style_entry: PathBuf,
    /// Generated font manifest, relative to `source`.
    pub font_manifest: PathBuf,
    /// Generated per-icon size classes, relative to `source`.
    pub sprite_styles: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "build".into(),
            style_entry: "scss/styles.scss".into(),
            font_manifest: "scss/.kiln/_font-families.scss".into(),
            sprite_styles: "scss/.kiln/_sprite.scss".into(),
        }
    }
}

/// Resolved project layout.
///
/// Absolute paths for reading and writing, plus root-relative glob patterns
/// for task inputs and watch bindings.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
    config: PathsConfig,
}

impl ProjectPaths {
    pub fn new(root: &Path, config: &PathsConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config: config.clone(),
        }
    }

    pub fn source(&self) -> PathBuf {
        self.root.join(&self.config.source)
    }

    pub fn output(&self) -> PathBuf {
        self.root.join(&self.config.output)
    }

    pub fn css_dir(&self) -> PathBuf {
        self.output().join("css")
    }

    pub fn js_dir(&self) -> PathBuf {
        self.output().join("js")
    }

    pub fn img_dir(&self) -> PathBuf {
        self.output().join("img")
    }

    pub fn sprite(&self) -> PathBuf {
        self.img_dir().join("sprite.svg")
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.output().join("fonts")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.output().join("resources")
    }

    pub fn style_entry(&self) -> PathBuf {
        self.source().join(&self.config.style_entry)
    }

    pub fn font_manifest(&self) -> PathBuf {
        self.source().join(&self.config.font_manifest)
    }

    pub fn sprite_styles(&self) -> PathBuf {
        self.source().join(&self.config.sprite_styles)
    }

    /// Where the icon pass writes normalized icons before sprite assembly.
    pub fn icons_prebuilt(&self) -> PathBuf {
        self.source().join("icons").join("pre-built")
    }

    /// Root-relative glob under the source tree, e.g. `src/js/**/*.js`.
    pub fn pattern(&self, rel: &str) -> String {
        let source = self.config.source.to_string_lossy().replace('\\', "/");
        let source = source.trim_end_matches('/');
        if source.is_empty() || source == "." {
            rel.to_string()
        } else {
            format!("{}/{rel}", glob::Pattern::escape(source))
        }
    }

    /// Root-relative glob for the stylesheet entry.
    pub fn style_entry_pattern(&self) -> String {
        let entry = self.config.style_entry.to_string_lossy().replace('\\', "/");
        self.pattern(&glob::Pattern::escape(&entry))
    }

    /// Path of `path` relative to the output root, `/`-separated.
    pub fn output_relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(self.output()).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> ProjectPaths {
        ProjectPaths::new(Path::new("/site"), &PathsConfig::default())
    }

    #[test]
    fn test_default_layout() {
        let p = paths();
        assert_eq!(p.source(), PathBuf::from("/site/src"));
        assert_eq!(p.output(), PathBuf::from("/site/build"));
        assert_eq!(p.sprite(), PathBuf::from("/site/build/img/sprite.svg"));
        assert_eq!(
            p.font_manifest(),
            PathBuf::from("/site/src/scss/.kiln/_font-families.scss")
        );
        assert_eq!(
            p.sprite_styles(),
            PathBuf::from("/site/src/scss/.kiln/_sprite.scss")
        );
        assert_eq!(p.icons_prebuilt(), PathBuf::from("/site/src/icons/pre-built"));
    }

    #[test]
    fn test_patterns() {
        let p = paths();
        assert_eq!(p.pattern("js/**/*.js"), "src/js/**/*.js");
        assert_eq!(p.style_entry_pattern(), "src/scss/styles.scss");

        let flat = ProjectPaths::new(
            Path::new("/site"),
            &PathsConfig {
                source: ".".into(),
                ..Default::default()
            },
        );
        assert_eq!(flat.pattern("*.html"), "*.html");
    }

    #[test]
    fn test_output_relative() {
        let p = paths();
        assert_eq!(
            p.output_relative(Path::new("/site/build/css/styles.css")),
            "css/styles.css"
        );
    }
}
