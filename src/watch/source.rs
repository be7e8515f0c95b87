//! Production event source: a `notify` watcher bridged into a tokio channel.

use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

/// How often missing roots are checked for re-attachment.
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(1);

const CHANNEL_CAPACITY: usize = 64;

/// Start watching `roots` recursively.
///
/// Events arrive on the returned receiver until it is dropped. Roots that
/// are missing now, or removed and recreated later, are attached once they
/// exist.
pub fn spawn(roots: Vec<PathBuf>) -> notify::Result<mpsc::Receiver<notify::Event>> {
    // notify calls back on its own thread
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })?;

    let mut watch_roots = WatchRoots::new(roots);
    watch_roots.attach_existing(&mut watcher)?;

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    std::thread::Builder::new()
        .name("kiln-watch".into())
        .spawn(move || {
            loop {
                match notify_rx.recv_timeout(MAINTAIN_INTERVAL) {
                    Ok(Ok(event)) => {
                        if tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                    Err(RecvTimeoutError::Timeout) => {
                        if tx.is_closed() {
                            break;
                        }
                        watch_roots.maintain(&mut watcher);
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })
        .map_err(|e| notify::Error::generic(&e.to_string()))?;

    Ok(rx)
}

/// Watch-root consistency manager.
///
/// Attaches existing roots at startup and re-attaches roots that were
/// removed and recreated.
struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    fn attach_existing(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for path in &self.desired {
            if !path.exists() {
                continue;
            }
            watcher.watch(path, RecursiveMode::Recursive)?;
            self.attached.insert(path.clone());
        }
        Ok(())
    }

    fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }
            if watcher.watch(path, RecursiveMode::Recursive).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "re-attached watch: {}", path.display());
            }
        }
    }
}
