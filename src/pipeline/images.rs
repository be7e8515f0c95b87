//! `img`: optimize (or copy) images and add lossless `.webp` siblings for
//! png/jpg/jpeg.

use super::output;
use crate::config::{ProjectConfig, ProjectPaths};
use crate::task::{Inputs, TaskError, TaskHandle, TransformRegistry, blocking};
use crate::utils::exec::{Cmd, resolve_args};
use anyhow::Result;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions handled by the image task.
pub const EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "ico", "webp"];

/// Extensions that also get a `.webp` sibling.
const WEBP_SOURCES: &[&str] = &["png", "jpg", "jpeg"];

pub fn patterns(paths: &ProjectPaths) -> Vec<String> {
    EXTENSIONS
        .iter()
        .map(|ext| paths.pattern(&format!("img/**/*.{ext}")))
        .collect()
}

pub fn register(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let inputs = Inputs::Globs(patterns(&config.paths()));
    let config = Arc::clone(config);
    reg.register("img", inputs, move |files| {
        let config = Arc::clone(&config);
        async move {
            output::for_each_file(files, |file| {
                let config = Arc::clone(&config);
                async move { process(&config, &file).await }
            })
            .await
        }
    })
}

async fn process(config: &ProjectConfig, file: &Path) -> Result<Vec<PathBuf>, TaskError> {
    let paths = config.paths();
    let target = output::rebase(file, &paths.source().join("img"), &paths.img_dir());

    if config.tools.image_optimizer.is_empty() {
        output::copy(file, &target).await?;
    } else {
        output::ensure_parent(&target).await?;
        let input = file.to_string_lossy();
        let out = target.to_string_lossy();
        let argv = resolve_args(
            &config.tools.image_optimizer,
            &[("INPUT", input.as_ref()), ("OUTPUT", out.as_ref())],
        );
        Cmd::from_slice(&argv).cwd(&config.root).run().await?;
    }

    let mut written = vec![target];
    if config.images.webp && wants_webp(file) {
        let webp = output::with_suffix(&written[0], "", "webp");
        let bytes = blocking({
            let file = file.to_path_buf();
            move || encode_webp(&file)
        })
        .await?;
        output::write(&webp, bytes).await?;
        written.push(webp);
    }
    Ok(written)
}

fn wants_webp(file: &Path) -> bool {
    file.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| WEBP_SOURCES.contains(&e.as_str()))
}

/// Decode a raster image and re-encode it as lossless WebP.
fn encode_webp(file: &Path) -> Result<Vec<u8>, TaskError> {
    let decoded = image::open(file)
        .map_err(|e| TaskError::Transform(format!("{}: {e}", file.display())))?;

    // The WebP encoder accepts 8-bit RGB/RGBA only.
    let normalized = if decoded.color().has_alpha() {
        DynamicImage::ImageRgba8(decoded.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(decoded.to_rgb8())
    };

    let mut buf = Cursor::new(Vec::new());
    normalized
        .write_to(&mut buf, ImageFormat::WebP)
        .map_err(|e| TaskError::Transform(format!("{}: {e}", file.display())))?;
    Ok(buf.into_inner())
}
