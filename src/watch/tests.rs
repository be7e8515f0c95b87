use super::*;
use crate::reload::ReloadEvent;
use crate::reload::testing::RecordingViewer;
use crate::task::{Inputs, TaskError, TransformRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Longer than the debounce window used below.
const SETTLE: Duration = Duration::from_millis(400);

struct Harness {
    _dir: TempDir,
    root: PathBuf,
    tx: mpsc::Sender<notify::Event>,
    viewer: RecordingViewer,
    session: JoinHandle<()>,
}

impl Harness {
    fn start(dir: TempDir, bindings: Vec<WatchBinding>, max_concurrent: usize) -> Self {
        let root = dir.path().to_path_buf();
        let notifier = ReloadNotifier::new();
        let viewer = RecordingViewer::default();
        notifier.connect(Box::new(viewer.clone()));

        let config = WatchConfig {
            debounce_ms: 300,
            max_concurrent,
        };
        let session = WatchSession::new(&root, bindings, &config, notifier);
        let (tx, rx) = mpsc::channel(16);
        let session = tokio::spawn(session.run(rx));

        Self {
            _dir: dir,
            root,
            tx,
            viewer,
            session,
        }
    }

    async fn touch(&self, rel: &str) {
        let event = notify::Event {
            kind: notify::EventKind::Modify(notify::event::ModifyKind::Data(
                notify::event::DataChange::Content,
            )),
            paths: vec![self.root.join(rel)],
            attrs: Default::default(),
        };
        self.tx.send(event).await.unwrap();
    }

    /// Close the event source and wait for the session to drain.
    async fn finish(self) -> Vec<String> {
        drop(self.tx);
        self.session.await.unwrap();
        self.viewer.frames()
    }
}

/// Task that counts invocations, optionally waiting on `gate` first.
fn counting(
    reg: &mut TransformRegistry,
    name: &str,
    count: &Arc<AtomicUsize>,
    gate: Option<&Arc<Semaphore>>,
) -> crate::task::Unit {
    let count = Arc::clone(count);
    let gate = gate.cloned();
    reg.register(name, Inputs::None, move |_| {
        let count = Arc::clone(&count);
        let gate = gate.clone();
        async move {
            count.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = gate {
                gate.acquire().await.map_err(|e| TaskError::transform(e.to_string()))?.forget();
            }
            Ok(Vec::new())
        }
    })
    .unwrap()
    .into()
}

fn binding(name: &'static str, pattern: &str, unit: crate::task::Unit) -> WatchBinding {
    WatchBinding::new(name, vec![pattern.to_string()], unit)
}

#[tokio::test(start_paused = true)]
async fn test_change_runs_only_matching_binding() {
    let dir = TempDir::new().unwrap();
    let mut reg = TransformRegistry::new(dir.path());
    let scripts = Arc::new(AtomicUsize::new(0));
    let markup = Arc::new(AtomicUsize::new(0));
    let bindings = vec![
        binding("scripts", "src/js/**/*.js", counting(&mut reg, "js:dev", &scripts, None))
            .reload(ReloadEvent::FullReload),
        binding("markup", "src/*.html", counting(&mut reg, "html", &markup, None))
            .reload(ReloadEvent::FullReload),
    ];
    let harness = Harness::start(dir, bindings, 4);

    harness.touch("src/js/app.js").await;
    harness.touch("src/js/app.js").await;
    harness.touch("build/index.html").await;
    tokio::time::sleep(SETTLE).await;

    let frames = harness.finish().await;
    assert_eq!(scripts.load(Ordering::SeqCst), 1);
    assert_eq!(markup.load(Ordering::SeqCst), 0);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1], r#"{"type":"reload"}"#);
}

#[tokio::test(start_paused = true)]
async fn test_triggers_while_running_coalesce() {
    let dir = TempDir::new().unwrap();
    let mut reg = TransformRegistry::new(dir.path());
    let count = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Semaphore::new(0));
    let bindings = vec![binding(
        "styles",
        "src/scss/**/*.scss",
        counting(&mut reg, "css:dev", &count, Some(&gate)),
    )];
    let harness = Harness::start(dir, bindings, 4);

    harness.touch("src/scss/styles.scss").await;
    tokio::time::sleep(SETTLE).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    for file in ["src/scss/_a.scss", "src/scss/_b.scss", "src/scss/styles.scss"] {
        harness.touch(file).await;
        tokio::time::sleep(SETTLE).await;
    }
    // still blocked in the first run
    assert_eq!(count.load(Ordering::SeqCst), 1);

    gate.add_permits(10);
    harness.finish().await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_does_not_end_session() {
    let dir = TempDir::new().unwrap();
    let mut reg = TransformRegistry::new(dir.path());
    let runs = Arc::new(AtomicUsize::new(0));
    let unit = {
        let runs = Arc::clone(&runs);
        reg.register("js:dev", Inputs::None, move |_| {
            let first = runs.fetch_add(1, Ordering::SeqCst) == 0;
            async move {
                if first {
                    Err(TaskError::transform("Unexpected token"))
                } else {
                    Ok(Vec::new())
                }
            }
        })
        .unwrap()
    };
    let bindings = vec![
        binding("scripts", "src/js/*.js", unit.into()).reload(ReloadEvent::FullReload),
    ];
    let harness = Harness::start(dir, bindings, 4);

    harness.touch("src/js/app.js").await;
    tokio::time::sleep(SETTLE).await;
    harness.touch("src/js/app.js").await;
    tokio::time::sleep(SETTLE).await;

    let frames = harness.finish().await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[1],
        r#"{"type":"error","task":"js:dev","message":"Unexpected token"}"#
    );
    assert_eq!(frames[2], r#"{"type":"reload"}"#);
}

#[tokio::test(start_paused = true)]
async fn test_style_binding_injects_stylesheet() {
    let dir = TempDir::new().unwrap();
    let mut reg = TransformRegistry::new(dir.path());
    let count = Arc::new(AtomicUsize::new(0));
    let bindings = vec![
        binding("styles", "src/scss/**/*.scss", counting(&mut reg, "css:dev", &count, None))
            .reload(ReloadEvent::StyleInject("css/styles.css".into())),
        binding("resources", "src/resources/**/*", counting(&mut reg, "resources", &count, None)),
    ];
    let harness = Harness::start(dir, bindings, 4);

    harness.touch("src/scss/.kiln/_font-families.scss").await;
    harness.touch("src/resources/docs/guide.pdf").await;
    tokio::time::sleep(SETTLE).await;

    let frames = harness.finish().await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
    // resources changes are not reload-eligible
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1], r#"{"type":"css","path":"css/styles.css"}"#);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_bounded() {
    let dir = TempDir::new().unwrap();
    let mut reg = TransformRegistry::new(dir.path());
    let count = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Semaphore::new(0));
    let bindings = vec![
        binding("a", "src/a/*", counting(&mut reg, "a", &count, Some(&gate))),
        binding("b", "src/b/*", counting(&mut reg, "b", &count, Some(&gate))),
    ];
    let harness = Harness::start(dir, bindings, 1);

    harness.touch("src/a/1.txt").await;
    harness.touch("src/b/1.txt").await;
    tokio::time::sleep(SETTLE).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);

    gate.add_permits(1);
    harness.finish().await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_pending_changes_flush_on_close() {
    let dir = TempDir::new().unwrap();
    let mut reg = TransformRegistry::new(dir.path());
    let count = Arc::new(AtomicUsize::new(0));
    let bindings = vec![binding("markup", "src/*.html", counting(&mut reg, "html", &count, None))];
    let harness = Harness::start(dir, bindings, 4);

    harness.touch("src/index.html").await;
    harness.touch("src/.index.html.swp").await;
    harness.finish().await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_closed_source_ends_idle_session() {
    let dir = TempDir::new().unwrap();
    let harness = Harness::start(dir, Vec::new(), 4);
    let frames = harness.finish().await;
    assert_eq!(frames.len(), 1);
}
