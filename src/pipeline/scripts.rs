//! `js:prod` / `js:dev`: copy scripts into the output tree; production also
//! writes a minified `<name>.min.js` next to each copy.

use super::{minify, output};
use crate::config::{ProjectConfig, ProjectPaths};
use crate::task::{Inputs, TaskError, TaskHandle, TransformRegistry, blocking};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn patterns(paths: &ProjectPaths) -> Vec<String> {
    vec![paths.pattern("js/**/*.js")]
}

pub fn register_prod(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let paths = config.paths();
    reg.register("js:prod", Inputs::Globs(patterns(&paths)), move |files| {
        let paths = paths.clone();
        async move {
            output::for_each_file(files, |file| {
                let paths = paths.clone();
                async move { copy_and_minify(&paths, &file).await }
            })
            .await
        }
    })
}

pub fn register_dev(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let paths = config.paths();
    reg.register("js:dev", Inputs::Globs(patterns(&paths)), move |files| {
        let paths = paths.clone();
        async move {
            output::for_each_file(files, |file| {
                let paths = paths.clone();
                async move {
                    let target = script_target(&paths, &file);
                    output::copy(&file, &target).await?;
                    Ok(vec![target])
                }
            })
            .await
        }
    })
}

fn script_target(paths: &ProjectPaths, file: &Path) -> PathBuf {
    output::rebase(file, &paths.source().join("js"), &paths.js_dir())
}

async fn copy_and_minify(paths: &ProjectPaths, file: &Path) -> Result<Vec<PathBuf>, TaskError> {
    let target = script_target(paths, file);
    let source = output::read_to_string(file).await?;

    let minified = blocking({
        let source = source.clone();
        move || Ok(minify::minify_js(&source))
    })
    .await?
    .map_err(|e| TaskError::Transform(format!("{}: {e}", file.display())))?;

    output::write(&target, source).await?;
    let min_target = output::with_suffix(&target, ".min", "js");
    output::write(&min_target, minified).await?;
    Ok(vec![target, min_target])
}
