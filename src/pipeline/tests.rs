use super::*;
use crate::config::test_config;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A project that needs no external tools.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("components")).unwrap();
    fs::create_dir_all(src.join("pages")).unwrap();
    fs::create_dir_all(src.join("js/lib")).unwrap();
    fs::create_dir_all(src.join("resources")).unwrap();

    fs::write(src.join("components/nav.html"), "<nav>home</nav>").unwrap();
    fs::write(
        src.join("index.html"),
        "<body>@include('components/nav.html')</body>",
    )
    .unwrap();
    fs::write(src.join("pages/about.html"), "<p>about</p>").unwrap();
    fs::write(src.join("js/app.js"), "function add(a, b) { return a + b; }\nadd(1, 2);\n").unwrap();
    fs::write(src.join("js/lib/util.js"), "var answer = 40 + 2;\n").unwrap();
    fs::write(src.join("resources/robots.txt"), "User-agent: *").unwrap();
    dir
}

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).unwrap().to_string_lossy().into_owned();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

fn pipeline(root: &Path) -> Pipeline {
    Pipeline::new(Arc::new(test_config(root))).unwrap()
}

#[tokio::test]
async fn test_build_removes_stray_output() {
    let dir = fixture();
    let stray = dir.path().join("build/old/stale.css");
    fs::create_dir_all(stray.parent().unwrap()).unwrap();
    fs::write(&stray, "stale").unwrap();

    let report = run_profile(&pipeline(dir.path()), Profile::Build).await;

    assert!(report.is_success(), "{:?}", report.failures().collect::<Vec<_>>());
    assert!(!stray.exists());
    assert!(!dir.path().join("build/old").exists());
    assert_eq!(report.leaves()[0].name, "clean");
}

#[tokio::test]
async fn test_build_writes_every_transform_output() {
    let dir = fixture();
    let report = run_profile(&pipeline(dir.path()), Profile::Build).await;
    assert!(report.is_success());

    let out = dir.path().join("build");
    assert_eq!(
        fs::read_to_string(out.join("index.html")).unwrap(),
        "<body><nav>home</nav></body>"
    );
    assert!(out.join("about.html").is_file());
    assert!(out.join("js/app.js").is_file());
    assert!(out.join("js/app.min.js").is_file());
    assert!(out.join("js/lib/util.min.js").is_file());
    assert!(out.join("resources/robots.txt").is_file());

    let manifest = dir.path().join("src/scss/.kiln/_font-families.scss");
    assert_eq!(fs::read_to_string(manifest).unwrap(), "");
}

#[tokio::test]
async fn test_zero_match_transforms_are_skipped() {
    let dir = fixture();
    let report = run_profile(&pipeline(dir.path()), Profile::Build).await;

    let outcome = |name: &str| {
        report
            .leaves()
            .iter()
            .find(|leaf| leaf.name == name)
            .map(|leaf| leaf.outcome.label())
    };
    assert_eq!(outcome("css:prod"), Some("skipped"));
    assert_eq!(outcome("img"), Some("skipped"));
    assert_eq!(outcome("fonts:convert"), Some("skipped"));
    // the skip did not abort the fonts sequence
    assert_eq!(report.invoked("fonts:manifest"), 1);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_unchanged_sources_build_identically() {
    let dir = fixture();
    let pipeline = pipeline(dir.path());

    assert!(run_profile(&pipeline, Profile::Build).await.is_success());
    let first = snapshot(&dir.path().join("build"));
    assert!(run_profile(&pipeline, Profile::Build).await.is_success());
    let second = snapshot(&dir.path().join("build"));

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_watch_profile_uses_dev_variants() {
    let dir = fixture();
    let report = run_profile(&pipeline(dir.path()), Profile::Watch).await;

    assert!(report.is_success());
    assert_eq!(report.invoked("js:dev"), 1);
    assert_eq!(report.invoked("js:prod"), 0);
    assert!(!dir.path().join("build/js/app.min.js").exists());
}

#[tokio::test]
async fn test_failing_transform_does_not_stop_siblings() {
    let dir = fixture();
    fs::write(dir.path().join("src/js/broken.js"), "function (").unwrap();

    let report = run_profile(&pipeline(dir.path()), Profile::Build).await;

    assert!(!report.is_success());
    let failed: Vec<_> = report.failures().map(|(name, _)| name.to_string()).collect();
    assert_eq!(failed, ["js:prod"]);
    assert!(dir.path().join("build/index.html").is_file());
    assert!(dir.path().join("build/resources/robots.txt").is_file());
}

#[test]
fn test_bindings() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(dir.path());
    let names: Vec<_> = pipeline.bindings().iter().map(|b| b.name).collect();
    assert_eq!(
        names,
        ["markup", "styles", "scripts", "images", "resources", "icons", "fonts"]
    );

    let find = |name: &str| pipeline.bindings().iter().find(|b| b.name == name).unwrap();
    assert_eq!(
        find("styles").reload,
        Some(ReloadEvent::StyleInject("css/styles.css".into()))
    );
    assert_eq!(find("resources").reload, None);
    assert_eq!(find("fonts").unit.name(), "fonts");
    assert_eq!(find("icons").unit.leaves().len(), 4);

    let root = dir.path();
    assert!(find("markup").matches(root, &root.join("src/components/nav.html")));
    assert!(!find("markup").matches(root, &root.join("build/index.html")));
    assert!(find("images").matches(root, &root.join("src/img/a/b.webp")));
}

#[test]
fn test_graph_shape() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(dir.path());
    let Unit::Sequence { members, .. } = pipeline.graph(Profile::Build) else {
        panic!("build graph is a sequence");
    };
    assert_eq!(members[0].name(), "clean");
    let Unit::Concurrent { members, .. } = &members[1] else {
        panic!("transforms run concurrently");
    };
    assert_eq!(members.len(), 7);
    let watch: Vec<_> = pipeline.graph(Profile::Watch).leaves().iter().map(|l| l.name()).collect();
    assert!(watch.contains(&"css:dev"));
    assert!(!watch.contains(&"css:prod"));
}
