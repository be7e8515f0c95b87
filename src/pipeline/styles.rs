//! `css:prod` / `css:dev`: compile the stylesheet entry with the external
//! sass compiler.
//!
//! Production output is prefixed for the configured browsers and gets a
//! `.min.css` sibling; development output carries an embedded source map.

use super::{minify, output};
use crate::config::ProjectConfig;
use crate::task::{Inputs, TaskError, TaskHandle, TransformRegistry, blocking};
use crate::utils::exec::{Cmd, SASS_FILTER, resolve_args};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn register_prod(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let inputs = Inputs::globs([config.paths().style_entry_pattern()]);
    let config = Arc::clone(config);
    reg.register("css:prod", inputs, move |files| {
        let config = Arc::clone(&config);
        async move {
            let mut written = Vec::new();
            for entry in files {
                written.extend(compile_prod(&config, &entry).await?);
            }
            Ok(written)
        }
    })
}

pub fn register_dev(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let inputs = Inputs::globs([config.paths().style_entry_pattern()]);
    let config = Arc::clone(config);
    reg.register("css:dev", inputs, move |files| {
        let config = Arc::clone(&config);
        async move {
            let mut written = Vec::new();
            for entry in files {
                let target = css_target(&config, &entry);
                run_sass(&config, &config.tools.sass_dev, &entry, &target).await?;
                written.push(target);
            }
            Ok(written)
        }
    })
}

/// `build/css/<stem>.css` for an entry `src/scss/<stem>.scss`.
pub fn css_target(config: &ProjectConfig, entry: &Path) -> PathBuf {
    let stem = entry.file_stem().unwrap_or_default().to_string_lossy();
    config.paths().css_dir().join(format!("{stem}.css"))
}

async fn compile_prod(config: &ProjectConfig, entry: &Path) -> Result<Vec<PathBuf>, TaskError> {
    let target = css_target(config, entry);
    run_sass(config, &config.tools.sass, entry, &target).await?;

    let compiled = output::read_to_string(&target).await?;
    let browsers = config.css.browsers.to_browsers();
    let want_min = config.css.minify;

    let (expanded, minified) = blocking(move || {
        let expanded = minify::process_css(&compiled, browsers, false);
        let minified = want_min.then(|| minify::process_css(&compiled, browsers, true));
        Ok((expanded, minified))
    })
    .await?;

    let label = target.display().to_string();
    let expanded = expanded.map_err(|e| TaskError::Transform(format!("{label}: {e}")))?;
    output::write(&target, expanded).await?;

    let mut written = vec![target.clone()];
    if let Some(minified) = minified {
        let minified = minified.map_err(|e| TaskError::Transform(format!("{label}: {e}")))?;
        let min_target = output::with_suffix(&target, ".min", "css");
        output::write(&min_target, minified).await?;
        written.push(min_target);
    }
    Ok(written)
}

async fn run_sass(
    config: &ProjectConfig,
    template: &[String],
    entry: &Path,
    target: &Path,
) -> Result<(), TaskError> {
    output::ensure_parent(target).await?;
    let input = entry.to_string_lossy();
    let out = target.to_string_lossy();
    let argv = resolve_args(template, &[("INPUT", input.as_ref()), ("OUTPUT", out.as_ref())]);
    Cmd::from_slice(&argv)
        .cwd(&config.root)
        .filter(&SASS_FILTER)
        .run()
        .await?;
    Ok(())
}
