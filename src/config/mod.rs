//! Project configuration management for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── css        # [css]
//! │   ├── images     # [images]
//! │   ├── paths      # [paths] + ProjectPaths resolver
//! │   ├── serve      # [serve]
//! │   ├── tools      # [tools]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! ├── util           # find_config_file
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `[paths]`   | Source/output roots, stylesheet entry, manifest    |
//! | `[serve]`   | Dev server interface, HTTP and WebSocket ports     |
//! | `[watch]`   | Debounce window and rebuild concurrency            |
//! | `[tools]`   | External commands (sass, font converters, ...)     |
//! | `[css]`     | Browser targets and minified output                |
//! | `[images]`  | WebP sibling generation                            |

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{
    CssConfig, ImagesConfig, PathsConfig, ProjectPaths, ServeConfig, ToolsConfig, WatchConfig,
};
use util::find_config_file;

use crate::{
    cli::{Cli, Commands, WatchArgs},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name looked up when `-C` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "kiln.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub css: CssConfig,

    #[serde(default)]
    pub images: ImagesConfig,
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. Without `-C`, a missing
    /// `kiln.toml` falls back to defaults rooted at cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                (config, root)
            }
            None if cli.config == Path::new(DEFAULT_CONFIG_NAME) => {
                debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG_NAME);
                (Self::default(), cwd)
            }
            None => return Err(ConfigError::NotFound(cli.config.clone()).into()),
        };

        config.validate()?;
        config.finalize(&root, cli);
        Ok(config)
    }

    /// Resolve root and apply CLI overrides.
    fn finalize(&mut self, root: &Path, cli: &Cli) {
        self.root = crate::utils::path::normalize_path(root);
        if !self.config_path.as_os_str().is_empty() {
            self.config_path = crate::utils::path::normalize_path(&self.config_path);
        }

        if let Commands::Watch { args } = cli.command() {
            self.apply_watch_args(&args);
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    /// Resolved layout for this project.
    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(&self.root, &self.paths)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_watch_args(&mut self, args: &WatchArgs) {
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        if args.no_serve {
            self.serve.enable = false;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate raw (not yet root-joined) values.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for (field, path) in [
            ("paths.source", &self.paths.source),
            ("paths.output", &self.paths.output),
            ("paths.style_entry", &self.paths.style_entry),
            ("paths.font_manifest", &self.paths.font_manifest),
            ("paths.sprite_styles", &self.paths.sprite_styles),
        ] {
            if path.is_absolute() {
                errors.push(format!("{field} must be relative to the project root"));
            }
        }

        let output = &self.paths.output;
        if output.as_os_str().is_empty() || output == Path::new(".") {
            errors.push("paths.output must not be the project root".to_string());
        } else if self.paths.source.starts_with(output) {
            errors.push("paths.source must not be inside paths.output".to_string());
        }

        if self.watch.max_concurrent == 0 {
            errors.push("watch.max_concurrent must be at least 1".to_string());
        }

        for field in self.tools.empty_required() {
            errors.push(format!("{field} must not be empty"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")).into())
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted at `root`.
#[cfg(test)]
pub fn test_config(root: &Path) -> ProjectConfig {
    ProjectConfig {
        root: root.to_path_buf(),
        ..Default::default()
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = ProjectConfig::from_str("[paths\nsource = \"src\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.paths.source, PathBuf::from("src"));
        assert_eq!(config.paths.output, PathBuf::from("build"));
        assert_eq!(config.serve.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\nsource = \"assets\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.paths.source, PathBuf::from("assets"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_validation_collects_errors() {
        let config = test_parse_config(
            "[paths]\noutput = \".\"\n[watch]\nmax_concurrent = 0",
        );
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("paths.output"));
        assert!(err.contains("watch.max_concurrent"));
    }

    #[test]
    fn test_source_inside_output_rejected() {
        let config = test_parse_config("[paths]\nsource = \"build/src\"");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watch_args_override_serve() {
        let cli = Cli::try_parse_from(["kiln", "watch", "--port", "4000", "--no-serve"]).unwrap();
        let mut config = ProjectConfig::default();
        config.finalize(Path::new("/tmp"), &cli);

        assert_eq!(config.serve.port, 4000);
        assert!(!config.serve.enable);
    }

    #[test]
    fn test_build_ignores_watch_overrides() {
        let cli = Cli::try_parse_from(["kiln", "build"]).unwrap();
        let mut config = ProjectConfig::default();
        config.finalize(Path::new("/tmp"), &cli);
        assert_eq!(config.serve.port, 3000);
        assert!(config.serve.enable);
    }

    #[test]
    fn test_root_relative() {
        let config = test_config(Path::new("/site"));
        assert_eq!(
            config.root_relative("/site/src/index.html"),
            PathBuf::from("src/index.html")
        );
    }
}
