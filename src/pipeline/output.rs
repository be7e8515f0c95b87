//! Filesystem helpers shared by the leaf transforms.

use crate::task::{TaskError, TaskResult};
use futures::{StreamExt, stream};
use std::future::Future;
use std::path::{Path, PathBuf};

/// Files processed at once inside a single task.
const PARALLEL_FILES: usize = 8;

/// Write `contents` to `path`, creating parent directories.
pub async fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), TaskError> {
    ensure_parent(path).await?;
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| TaskError::io(path, e))
}

/// Copy `from` to `to`, creating parent directories.
pub async fn copy(from: &Path, to: &Path) -> Result<(), TaskError> {
    ensure_parent(to).await?;
    tokio::fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| TaskError::io(from, e))
}

pub async fn read_to_string(path: &Path) -> Result<String, TaskError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TaskError::io(path, e))
}

pub async fn ensure_parent(path: &Path) -> Result<(), TaskError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TaskError::io(parent, e)),
        _ => Ok(()),
    }
}

/// Move `file` from under `from_dir` to the same relative place under `to_dir`.
///
/// Files outside `from_dir` keep only their file name.
pub fn rebase(file: &Path, from_dir: &Path, to_dir: &Path) -> PathBuf {
    match file.strip_prefix(from_dir) {
        Ok(rel) => to_dir.join(rel),
        Err(_) => to_dir.join(file.file_name().unwrap_or_default()),
    }
}

/// Replace the extension, keeping any other dots in the name.
///
/// `app.min` + `js` is `app.min.js`; `logo.png` + `webp` is `logo.webp`.
pub fn with_suffix(path: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

/// Run `op` over every file with bounded parallelism.
///
/// Every file is attempted; the task fails afterwards if any file failed.
/// Outputs keep input order.
pub async fn for_each_file<F, Fut>(files: Vec<PathBuf>, op: F) -> TaskResult
where
    F: Fn(PathBuf) -> Fut,
    Fut: Future<Output = TaskResult>,
{
    let total = files.len();
    let results: Vec<_> = stream::iter(files)
        .map(op)
        .buffered(PARALLEL_FILES)
        .collect()
        .await;
    merge_results(total, results)
}

/// Concatenate outputs, or fail with every collected message.
pub fn merge_results(total: usize, results: Vec<TaskResult>) -> TaskResult {
    let mut outputs = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(paths) => outputs.extend(paths),
            Err(e) => errors.push(e),
        }
    }

    match errors.len() {
        0 => Ok(outputs),
        1 => Err(errors.remove(0)),
        n => {
            let detail: Vec<_> = errors.iter().map(ToString::to_string).collect();
            Err(TaskError::Transform(format!(
                "{n} of {total} failed:\n{}",
                detail.join("\n")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase() {
        assert_eq!(
            rebase(
                Path::new("/p/src/js/lib/a.js"),
                Path::new("/p/src/js"),
                Path::new("/p/build/js")
            ),
            PathBuf::from("/p/build/js/lib/a.js")
        );
        assert_eq!(
            rebase(Path::new("/x/a.js"), Path::new("/p/src"), Path::new("/p/build")),
            PathBuf::from("/p/build/a.js")
        );
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("build/js/app.js"), ".min", "js"),
            PathBuf::from("build/js/app.min.js")
        );
        assert_eq!(
            with_suffix(Path::new("build/img/logo.png"), "", "webp"),
            PathBuf::from("build/img/logo.webp")
        );
    }

    #[test]
    fn test_merge_results() {
        let ok = merge_results(2, vec![Ok(vec!["a".into()]), Ok(vec!["b".into()])]).unwrap();
        assert_eq!(ok.len(), 2);

        let single = merge_results(2, vec![Ok(vec![]), Err(TaskError::transform("bad font"))]);
        assert_eq!(single.unwrap_err().to_string(), "bad font");

        let many = merge_results(
            3,
            vec![
                Err(TaskError::transform("one")),
                Ok(vec![]),
                Err(TaskError::transform("two")),
            ],
        );
        let msg = many.unwrap_err().to_string();
        assert!(msg.starts_with("2 of 3 failed"));
        assert!(msg.contains("one") && msg.contains("two"));
    }

    #[tokio::test]
    async fn test_write_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("a/b/c.txt");
        write(&target, "x").await.unwrap();
        assert_eq!(std::fs::read_to_string(target).unwrap(), "x");
    }
}
