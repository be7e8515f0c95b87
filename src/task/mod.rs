//! Task orchestration core.
//!
//! Leaf transforms are registered by name in a [`TransformRegistry`],
//! composed into [`Unit`]s with [`sequence`] and [`concurrent`], and run by
//! [`executor::run`], which always produces a [`Report`].
//!
//! ```text
//! register(name, inputs, apply) ──► TaskHandle
//!                                      │
//!            sequence / concurrent ◄───┘
//!                     │
//!                     ▼
//!               executor::run ──► Report { LeafRecord* }
//! ```

mod error;
pub mod executor;
mod graph;
mod input;
mod outcome;
mod registry;


pub use error::{TaskError, panic_message};
pub use graph::{Unit, concurrent, sequence};
pub use input::Inputs;
pub use outcome::{LeafRecord, Outcome, Report};
pub use registry::{TaskHandle, TaskResult, TransformRegistry};

/// Run CPU-bound work off the async workers.
///
/// A panic inside `f` becomes [`TaskError::Panicked`].
pub async fn blocking<T, F>(f: F) -> Result<T, TaskError>
where
    F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(TaskError::Panicked(panic_message(e.into_panic().as_ref()))),
        Err(e) => Err(TaskError::Panicked(e.to_string())),
    }
}
