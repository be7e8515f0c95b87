//! Filesystem path normalization.

use std::path::{Path, PathBuf};

/// Normalize a path to absolute form.
///
/// Tries `canonicalize()` first, which also resolves symlinks. A path that
/// does not exist (e.g. a removed file reported by the watcher) is kept as-is
/// when absolute and joined onto cwd otherwise.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}
