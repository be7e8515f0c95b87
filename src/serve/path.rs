//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: strip query string and fragment, decode, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::create_dir_all(dir.path().join("img/my icons")).unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::write(dir.path().join("css/styles.css"), "a{}").unwrap();
        fs::write(dir.path().join("img/my icons/a.svg"), "<svg/>").unwrap();
        dir
    }

    #[test]
    fn test_root_serves_index() {
        let dir = site();
        let path = resolve_path("/", dir.path()).unwrap();
        assert!(path.ends_with("index.html"));
    }

    #[test]
    fn test_query_is_ignored() {
        let dir = site();
        let path = resolve_path("/css/styles.css?v=1712", dir.path()).unwrap();
        assert!(path.ends_with("css/styles.css"));
    }

    #[test]
    fn test_percent_decoding() {
        let dir = site();
        assert!(resolve_path("/img/my%20icons/a.svg", dir.path()).is_some());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        assert!(resolve_path("/../etc/passwd", dir.path()).is_none());
        assert!(resolve_path("/css/%2e%2e/%2e%2e/x", dir.path()).is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = site();
        assert!(resolve_path("/nope.html", dir.path()).is_none());
        assert!(resolve_path("/css", dir.path()).is_none());
    }
}
