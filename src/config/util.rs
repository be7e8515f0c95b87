//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found.
///
/// # Example
/// ```text
/// /home/user/site/src/scss/   ← start
/// /home/user/site/kiln.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kiln.toml"), "").unwrap();
        let nested = dir.path().join("src/scss/base");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(Path::new("kiln.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("kiln.toml"));
    }

    #[test]
    fn test_find_config_absolute_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(find_config_file(&missing, dir.path()).is_none());
    }

    #[test]
    fn test_directory_with_config_name_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/kiln.toml")).unwrap();
        let start = dir.path().join("a");
        // A directory named like the config is not a config file.
        assert_ne!(
            find_config_file(Path::new("kiln.toml"), &start),
            Some(start.join("kiln.toml"))
        );
    }
}
