//! `html`: expand `@include('path')` fragments and write pages.
//!
//! Includes resolve relative to the including file and may nest. Pages under
//! `pages/` are written to the output root (`src/pages/about.html` becomes
//! `build/about.html`).

use super::output;
use crate::config::{ProjectConfig, ProjectPaths};
use crate::task::{Inputs, TaskError, TaskHandle, TransformRegistry, blocking};
use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

/// Nesting limit for includes.
const MAX_INCLUDE_DEPTH: usize = 32;

static INCLUDE_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r#"@include\([ \t]*['"]([^'"]+)['"][ \t]*\)"#));

pub fn patterns(paths: &ProjectPaths) -> Vec<String> {
    vec![paths.pattern("*.html"), paths.pattern("pages/**/*.html")]
}

pub fn register(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let paths = config.paths();
    reg.register("html", Inputs::Globs(patterns(&paths)), move |files| {
        let paths = paths.clone();
        async move {
            output::for_each_file(files, |file| {
                let paths = paths.clone();
                async move {
                    let html = blocking({
                        let file = file.clone();
                        move || expand_includes(&file)
                    })
                    .await?;
                    let target = page_target(&paths, &file);
                    output::write(&target, html).await?;
                    Ok(vec![target])
                }
            })
            .await
        }
    })
}

/// Output location for a page: relative to the source root, with a leading
/// `pages/` segment dropped.
pub fn page_target(paths: &ProjectPaths, file: &Path) -> PathBuf {
    let source = paths.source();
    let rel = file.strip_prefix(&source).unwrap_or(file);
    let rel = rel.strip_prefix("pages").unwrap_or(rel);
    paths.output().join(rel)
}

/// Read `path` and recursively replace every include directive with the
/// referenced file's expanded contents.
pub fn expand_includes(path: &Path) -> Result<String, TaskError> {
    let mut stack = Vec::new();
    expand(path, &mut stack)
}

fn expand(path: &Path, stack: &mut Vec<PathBuf>) -> Result<String, TaskError> {
    let canonical = path.canonicalize().map_err(|e| TaskError::io(path, e))?;

    if stack.contains(&canonical) {
        let chain: Vec<_> = stack
            .iter()
            .chain(std::iter::once(&canonical))
            .map(|p| p.display().to_string())
            .collect();
        return Err(TaskError::Transform(format!(
            "include cycle: {}",
            chain.join(" -> ")
        )));
    }
    if stack.len() >= MAX_INCLUDE_DEPTH {
        return Err(TaskError::Transform(format!(
            "{}: includes nested deeper than {MAX_INCLUDE_DEPTH}",
            path.display()
        )));
    }

    let source = std::fs::read_to_string(&canonical).map_err(|e| TaskError::io(path, e))?;
    let re = INCLUDE_RE
        .as_ref()
        .map_err(|e| TaskError::Transform(format!("include directive pattern: {e}")))?;

    let base = canonical.parent().unwrap_or(Path::new(""));
    stack.push(canonical.clone());

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for caps in re.captures_iter(&source) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&source[last..whole.start()]);
        out.push_str(&expand(&base.join(target.as_str()), stack)?);
        last = whole.end();
    }
    out.push_str(&source[last..]);

    stack.pop();
    Ok(out)
}
