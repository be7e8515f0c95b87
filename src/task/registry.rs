//! Catalog of named leaf tasks.

use super::{Inputs, LeafRecord, Outcome, TaskError, panic_message};
use anyhow::{Result, bail};
use futures::FutureExt;
use futures::future::BoxFuture;
use rustc_hash::FxHashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Output of a transform: the paths it wrote.
pub type TaskResult = Result<Vec<PathBuf>, TaskError>;

type ApplyFn = dyn Fn(Vec<PathBuf>) -> BoxFuture<'static, TaskResult> + Send + Sync;

struct Task {
    name: String,
    inputs: Inputs,
    root: PathBuf,
    apply: Box<ApplyFn>,
}

/// Shared, cheap-to-clone reference to a registered task.
#[derive(Clone)]
pub struct TaskHandle(Arc<Task>);

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Resolve inputs and invoke the transform once.
    ///
    /// Never panics and never returns an error: everything that goes wrong
    /// is folded into the record's outcome.
    pub async fn run(&self) -> LeafRecord {
        let start = Instant::now();
        let outcome = self.invoke().await;
        LeafRecord {
            name: self.0.name.clone(),
            outcome,
            elapsed: start.elapsed(),
        }
    }

    async fn invoke(&self) -> Outcome {
        let matched = match self.0.inputs.resolve(&self.0.root).await {
            Ok(Some(files)) if files.is_empty() => return Outcome::Skipped,
            Ok(Some(files)) => files,
            Ok(None) => Vec::new(),
            Err(e) => return Outcome::Failure(e),
        };

        let apply = &self.0.apply;
        let guarded = AssertUnwindSafe(async move { apply(matched).await }).catch_unwind();
        match guarded.await {
            Ok(Ok(outputs)) => Outcome::Success(outputs),
            Ok(Err(e)) => Outcome::Failure(e),
            Err(payload) => Outcome::Failure(TaskError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.0.name)
            .field("inputs", &self.0.inputs)
            .finish()
    }
}

/// Registry of leaf tasks for one project root.
pub struct TransformRegistry {
    root: PathBuf,
    tasks: FxHashMap<String, TaskHandle>,
}

impl TransformRegistry {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            tasks: FxHashMap::default(),
        }
    }

    /// Register a transform under a unique name.
    ///
    /// `apply` receives the sorted, de-duplicated matched paths (empty for
    /// tasks without declared inputs) and returns the paths it wrote.
    pub fn register<F, Fut>(
        &mut self,
        name: impl Into<String>,
        inputs: Inputs,
        apply: F,
    ) -> Result<TaskHandle>
    where
        F: Fn(Vec<PathBuf>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            bail!("task `{name}` is already registered");
        }

        let handle = TaskHandle(Arc::new(Task {
            name: name.clone(),
            inputs,
            root: self.root.clone(),
            apply: Box::new(move |files| apply(files).boxed()),
        }));
        self.tasks.insert(name, handle.clone());
        Ok(handle)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}
