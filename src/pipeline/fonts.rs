//! `fonts`: convert TTF sources to web fonts, then regenerate the stylesheet
//! manifest that includes one `@font-face` mixin call per font family.
//!
//! The two steps always run as a sequence, so the manifest only ever sees a
//! fully converted font directory.

use super::output;
use crate::config::{ProjectConfig, ProjectPaths};
use crate::task::{Inputs, TaskError, TaskHandle, TransformRegistry, Unit, sequence};
use crate::utils::exec::{Cmd, resolve_args};
use anyhow::Result;
use rustc_hash::FxHashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions of converted fonts that earn a manifest entry.
const MANIFEST_EXTENSIONS: &[&str] = &["woff", "woff2"];

pub fn patterns(paths: &ProjectPaths) -> Vec<String> {
    vec![paths.pattern("fonts/**/*.ttf")]
}

/// Register `fonts:convert` and `fonts:manifest` and return their sequence.
pub fn register(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<Unit> {
    let convert = register_convert(reg, config)?;
    let manifest = register_manifest(reg, config)?;
    Ok(sequence("fonts", [convert.into(), manifest.into()]))
}

fn register_convert(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let inputs = Inputs::Globs(patterns(&config.paths()));
    let config = Arc::clone(config);
    reg.register("fonts:convert", inputs, move |files| {
        let config = Arc::clone(&config);
        async move {
            let paths = config.paths();
            let (source_dir, fonts_dir) = (paths.source().join("fonts"), paths.fonts_dir());
            let jobs: Vec<_> = files
                .iter()
                .flat_map(|file| {
                    [("woff", &config.tools.woff), ("woff2", &config.tools.woff2)]
                        .map(|(ext, template)| (file.clone(), ext, template.clone()))
                })
                .collect();

            let total = jobs.len();
            let results = futures::future::join_all(jobs.into_iter().map(|(file, ext, template)| {
                let target = output::with_suffix(&output::rebase(&file, &source_dir, &fonts_dir), "", ext);
                let root = config.root.clone();
                async move {
                    convert(&root, &template, &file, &target).await?;
                    Ok::<_, TaskError>(vec![target])
                }
            }))
            .await;
            output::merge_results(total, results)
        }
    })
}

fn register_manifest(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let paths = config.paths();
    reg.register("fonts:manifest", Inputs::None, move |_| {
        let paths = paths.clone();
        async move {
            let manifest = paths.font_manifest();
            synthesize_manifest(&paths.fonts_dir(), &manifest).await?;
            Ok(vec![manifest])
        }
    })
}

/// Run one configured converter (`$INPUT` -> `$OUTPUT`).
async fn convert(root: &Path, template: &[String], input: &Path, target: &Path) -> Result<(), TaskError> {
    output::ensure_parent(target).await?;
    let input = input.to_string_lossy();
    let out = target.to_string_lossy();
    let argv = resolve_args(template, &[("INPUT", input.as_ref()), ("OUTPUT", out.as_ref())]);
    Cmd::from_slice(&argv).cwd(root).run().await?;
    Ok(())
}

/// Regenerate `manifest` from the converted fonts in `fonts_dir`.
///
/// Only the top level of `fonts_dir` is listed; fonts converted from nested
/// source folders keep their folder but earn no manifest entry.
///
/// One `@include font(<name>, <name>);` line per distinct logical name, in
/// directory-listing order. The logical name is the file name up to the
/// first `.`; only `woff`/`woff2` files count. A missing `fonts_dir` yields
/// an empty manifest.
pub async fn synthesize_manifest(fonts_dir: &Path, manifest: &Path) -> Result<(), TaskError> {
    let mut names = Vec::new();

    match tokio::fs::read_dir(fonts_dir).await {
        Ok(mut entries) => {
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| TaskError::io(fonts_dir, e))?
            {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(TaskError::io(fonts_dir, e)),
    }

    output::write(manifest, render_manifest(names.iter().map(String::as_str))).await
}

/// Manifest text for a directory listing.
pub fn render_manifest<'a>(listing: impl IntoIterator<Item = &'a str>) -> String {
    let mut seen = FxHashSet::default();
    let mut out = String::new();

    for file_name in listing {
        let mut parts = file_name.split('.');
        let name = parts.next().unwrap_or_default();
        let ext = parts.next().unwrap_or_default();

        if name.is_empty() || !MANIFEST_EXTENSIONS.contains(&ext) {
            continue;
        }
        if seen.insert(name) {
            out.push_str(&format!("@include font({name}, {name});\n"));
        }
    }
    out
}

/// Register the standalone `ttf` task: `.otf` sources become `.ttf` files
/// next to them.
pub fn register_otf2ttf(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let inputs = Inputs::globs([config.paths().pattern("fonts/**/*.otf")]);
    let config = Arc::clone(config);
    reg.register("ttf", inputs, move |files| {
        let config = Arc::clone(&config);
        async move {
            output::for_each_file(files, |file| {
                let config = Arc::clone(&config);
                async move {
                    let target: PathBuf = file.with_extension("ttf");
                    convert(&config.root, &config.tools.otf2ttf, &file, &target).await?;
                    Ok(vec![target])
                }
            })
            .await
        }
    })
}
