//! `clean`: empty the output tree before any transform writes.

use crate::config::ProjectConfig;
use crate::task::{Inputs, TaskError, TaskHandle, TransformRegistry};
use anyhow::Result;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

pub fn register(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let output = config.paths().output();
    reg.register("clean", Inputs::None, move |_| {
        let output = output.clone();
        async move {
            clean_dir(&output).await?;
            Ok(Vec::new())
        }
    })
}

/// Remove everything inside `dir`, keeping `dir` itself.
///
/// An absent directory is already clean.
pub async fn clean_dir(dir: &Path) -> Result<(), TaskError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(TaskError::io(dir, e)),
    };

    while let Some(entry) = entries.next_entry().await.map_err(|e| TaskError::io(dir, e))? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| TaskError::io(&path, e))?;
        let removed = if file_type.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match removed {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(TaskError::io(&path, e)),
        }
    }
    Ok(())
}
