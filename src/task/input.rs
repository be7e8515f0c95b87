//! Declared inputs of a leaf task.
//!
//! Patterns are written relative to the project root in `glob` syntax
//! (`*`, `**`, `?`, `[...]`). Alternation is expressed as several patterns.

use super::TaskError;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// What a task reads.
#[derive(Debug, Clone, Default)]
pub enum Inputs {
    /// No declared inputs: the task always runs and is never skipped.
    #[default]
    None,
    /// Root-relative glob patterns.
    Globs(Vec<String>),
}

impl Inputs {
    pub fn globs<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Globs(patterns.into_iter().map(Into::into).collect())
    }

    pub fn patterns(&self) -> &[String] {
        match self {
            Self::None => &[],
            Self::Globs(patterns) => patterns,
        }
    }

    /// Resolve against `root`.
    ///
    /// Returns `None` when no inputs are declared, otherwise the matched
    /// regular files, sorted and de-duplicated.
    pub async fn resolve(&self, root: &Path) -> Result<Option<Vec<PathBuf>>, TaskError> {
        let Self::Globs(patterns) = self else {
            return Ok(None);
        };

        let root = root.to_path_buf();
        let patterns = patterns.clone();
        let files = tokio::task::spawn_blocking(move || resolve_blocking(&root, &patterns))
            .await
            .map_err(|e| TaskError::Panicked(e.to_string()))??;
        Ok(Some(files))
    }

    /// Whether an absolute `path` under `root` is covered by these inputs.
    pub fn matches(&self, root: &Path, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(root) else {
            return false;
        };
        self.patterns()
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|p| p.matches_path_with(rel, MATCH_OPTIONS))
    }
}

fn resolve_blocking(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, TaskError> {
    let base = Pattern::escape(&root.to_string_lossy());
    let mut files = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
        let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| {
            TaskError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.msg.to_string(),
            }
        })?;

        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => {
                    crate::debug!("task"; "skipping unreadable path: {}", e);
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
