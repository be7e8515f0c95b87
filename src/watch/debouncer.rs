use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::time::Instant;

use crate::utils::path::normalize_path;

/// Sleep used while nothing is pending.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Timing and per-path deduplication of raw watcher events.
pub(super) struct Debouncer {
    window: Duration,
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Create/Modify → Create/Modify (file was restored)
    /// - Modify + Remove → Remove (file was deleted)
    /// - Create + Remove → nothing (appeared then vanished)
    /// - Same type events: first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // mtime/atime/chmod noise
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);

            match self.changes.get(&path).copied() {
                None => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                Some(_) => {}
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the pending changes once the window has passed since the last event.
    ///
    /// Disarms the timer even when every change cancelled out.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }
        self.drain()
    }

    /// Take the pending changes regardless of timing.
    pub(super) fn drain(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        (!changes.is_empty()).then_some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        last_event.elapsed() >= self.window
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE_SLEEP;
        };
        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || (name.starts_with('.') && name != ".htaccess")
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    fn event(kind: notify::EventKind, path: &str) -> notify::Event {
        notify::Event {
            kind,
            paths: vec![PathBuf::from(path)],
            attrs: Default::default(),
        }
    }

    fn modify() -> notify::EventKind {
        notify::EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Any,
        ))
    }

    fn create() -> notify::EventKind {
        notify::EventKind::Create(notify::event::CreateKind::File)
    }

    fn remove() -> notify::EventKind {
        notify::EventKind::Remove(notify::event::RemoveKind::File)
    }

    #[test]
    fn test_empty_is_not_ready() {
        let debouncer = Debouncer::new(WINDOW);
        assert!(!debouncer.is_ready());
        assert_eq!(debouncer.sleep_duration(), IDLE_SLEEP);
    }

    #[test]
    fn test_dedup_by_path() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.add_event(&event(modify(), "/p/src/a.js"));
        debouncer.add_event(&event(modify(), "/p/src/a.js"));
        debouncer.add_event(&event(create(), "/p/src/b.js"));
        assert_eq!(debouncer.changes.len(), 2);
    }

    #[test]
    fn test_kind_transitions() {
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.add_event(&event(remove(), "/p/restored.scss"));
        debouncer.add_event(&event(create(), "/p/restored.scss"));
        debouncer.add_event(&event(modify(), "/p/deleted.scss"));
        debouncer.add_event(&event(remove(), "/p/deleted.scss"));
        debouncer.add_event(&event(create(), "/p/flash.scss"));
        debouncer.add_event(&event(remove(), "/p/flash.scss"));

        let changes = &debouncer.changes;
        assert_eq!(changes[Path::new("/p/restored.scss")], ChangeKind::Created);
        assert_eq!(changes[Path::new("/p/deleted.scss")], ChangeKind::Removed);
        assert!(!changes.contains_key(Path::new("/p/flash.scss")));
    }

    #[test]
    fn test_ignores_metadata_and_temp_files() {
        let mut debouncer = Debouncer::new(WINDOW);
        let metadata = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::WriteTime,
        ));
        debouncer.add_event(&event(metadata, "/p/src/a.js"));
        debouncer.add_event(&event(modify(), "/p/src/.a.js.swp"));
        debouncer.add_event(&event(modify(), "/p/src/a.js~"));
        debouncer.add_event(&event(create(), "/p/src/#a.js.tmp"));
        debouncer.add_event(&event(notify::EventKind::Any, "/p/src/b.js"));

        assert!(debouncer.changes.is_empty());
        assert!(!debouncer.is_ready());
    }

    #[test]
    fn test_temp_file_names() {
        assert!(is_temp_file(Path::new("a/.#index.html")));
        assert!(is_temp_file(Path::new("a/styles.scss.bak")));
        assert!(!is_temp_file(Path::new("a/_font-families.scss")));
        assert!(!is_temp_file(Path::new("a/.htaccess")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_window() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.add_event(&event(modify(), "/p/src/a.js"));
        assert!(debouncer.take_if_ready().is_none());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(!debouncer.is_ready());
        // a new event restarts the window
        debouncer.add_event(&event(modify(), "/p/src/b.js"));
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(!debouncer.is_ready());
        assert_eq!(debouncer.sleep_duration(), Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(100)).await;
        let changes = debouncer.take_if_ready().unwrap();
        assert_eq!(changes.len(), 2);
        assert!(debouncer.take_if_ready().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_changes_disarm_timer() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.add_event(&event(create(), "/p/src/a.scss"));
        debouncer.add_event(&event(remove(), "/p/src/a.scss"));
        assert!(debouncer.changes.is_empty());

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(debouncer.take_if_ready().is_none());
        assert_eq!(debouncer.sleep_duration(), IDLE_SLEEP);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(!debouncer.is_ready());
        assert_eq!(debouncer.sleep_duration(), IDLE_SLEEP);
    }
}
