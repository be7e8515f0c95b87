//! Resident watch session.
//!
//! ```text
//! notify::Event ─► Debouncer ─► bindings (glob match) ─► run unit ─► ReloadNotifier
//!                                    │                       │
//!                                    └── Idle ◄── Running{pending}
//! ```
//!
//! Each binding is either idle or running. A trigger while running only sets
//! `pending`, so any number of triggers during a run yield exactly one
//! follow-up run. Bindings run independently, bounded by a semaphore.

mod binding;
mod debouncer;
pub mod source;

#[cfg(test)]
mod tests;

pub use binding::WatchBinding;
pub use debouncer::ChangeKind;

use crate::config::WatchConfig;
use crate::logger::{status_error, status_success};
use crate::reload::{ReloadMessage, ReloadNotifier};
use crate::task::{Report, executor};
use debouncer::Debouncer;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    Idle,
    Running { pending: bool },
}

/// A finished run: binding index and its report.
type Completion = (usize, Report);

/// Owns the bindings and their run state for the lifetime of `watch`.
pub struct WatchSession {
    root: PathBuf,
    bindings: Vec<WatchBinding>,
    states: Vec<BindingState>,
    debouncer: Debouncer,
    permits: Arc<Semaphore>,
    notifier: ReloadNotifier,
}

impl WatchSession {
    pub fn new(
        root: impl Into<PathBuf>,
        bindings: Vec<WatchBinding>,
        config: &WatchConfig,
        notifier: ReloadNotifier,
    ) -> Self {
        Self {
            root: root.into(),
            states: vec![BindingState::Idle; bindings.len()],
            bindings,
            debouncer: Debouncer::new(config.debounce()),
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            notifier,
        }
    }

    /// Consume events until `events` closes and every run has finished.
    pub async fn run(mut self, mut events: mpsc::Receiver<notify::Event>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
        let mut open = true;

        loop {
            if !open && self.is_idle() {
                break;
            }

            tokio::select! {
                biased;
                Some((index, report)) = done_rx.recv() => self.finish(index, report, &done_tx).await,
                event = events.recv(), if open => match event {
                    Some(event) => self.debouncer.add_event(&event),
                    None => {
                        open = false;
                        if let Some(changes) = self.debouncer.drain() {
                            self.dispatch(&changes, &done_tx);
                        }
                    }
                },
                () = tokio::time::sleep(self.debouncer.sleep_duration()), if open => {
                    if let Some(changes) = self.debouncer.take_if_ready() {
                        self.dispatch(&changes, &done_tx);
                    }
                }
            }
        }

        crate::debug!("watch"; "session ended");
    }

    fn is_idle(&self) -> bool {
        self.states.iter().all(|s| *s == BindingState::Idle)
    }

    fn dispatch(&mut self, changes: &FxHashMap<PathBuf, ChangeKind>, done: &mpsc::UnboundedSender<Completion>) {
        let mut changes: Vec<_> = changes
            .iter()
            .filter(|(path, kind)| **kind == ChangeKind::Removed || !path.is_dir())
            .collect();
        changes.sort_by(|a, b| a.0.cmp(b.0));

        for (path, kind) in &changes {
            crate::log!("watch"; "{}: {}", kind.label(), self.relative(path));
        }

        for index in 0..self.bindings.len() {
            let binding = &self.bindings[index];
            if changes.iter().any(|(path, _)| binding.matches(&self.root, path)) {
                self.trigger(index, done);
            }
        }
    }

    fn trigger(&mut self, index: usize, done: &mpsc::UnboundedSender<Completion>) {
        match self.states[index] {
            BindingState::Idle => self.start(index, done),
            BindingState::Running { .. } => {
                self.states[index] = BindingState::Running { pending: true };
                crate::debug!("watch"; "{} busy, queued one more run", self.bindings[index].name);
            }
        }
    }

    fn start(&mut self, index: usize, done: &mpsc::UnboundedSender<Completion>) {
        self.states[index] = BindingState::Running { pending: false };

        let unit = self.bindings[index].unit.clone();
        let permits = Arc::clone(&self.permits);
        let done = done.clone();
        tokio::spawn(async move {
            let report = match permits.acquire_owned().await {
                Ok(_permit) => executor::run(&unit).await,
                Err(_) => Report::new(),
            };
            let _ = done.send((index, report));
        });
    }

    async fn finish(&mut self, index: usize, report: Report, done: &mpsc::UnboundedSender<Completion>) {
        let binding = &self.bindings[index];
        let mut messages: Vec<ReloadMessage> = Vec::new();

        if report.is_success() {
            status_success(&format!(
                "{} rebuilt in {}ms",
                binding.name,
                report.elapsed().as_millis()
            ));
            if let Some(event) = &binding.reload {
                messages.push(event.into());
            }
        } else {
            let mut detail = Vec::new();
            for (task, error) in report.failures() {
                let message = error.to_string();
                messages.push(ReloadMessage::error(task, &message));
                detail.push(format!("{task}: {message}"));
            }
            status_error(&format!("{} failed", binding.name), &detail.join("\n"));
        }
        if !messages.is_empty() {
            self.notifier.publish(messages).await;
        }

        let pending = self.states[index] == BindingState::Running { pending: true };
        self.states[index] = BindingState::Idle;
        if pending {
            self.start(index, done);
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
