//! `icons`: normalize icon sets and assemble the SVG sprite.
//!
//! ```text
//! icons:clean ─► ┌ icons:monochrome (strip fill/stroke/style) ┐ ─► icons:sprite
//!                └ icons:colorful   (whitespace-minify)      ┘
//! ```
//!
//! Both normalizers write into `src/icons/pre-built/`; the sprite turns each
//! pre-built icon into `<symbol id="i-<name>">` inside `build/img/sprite.svg`
//! and writes a `.i-<name> { width; height }` class per sized icon into the
//! generated `_sprite.scss`.

use super::{clean, output};
use crate::config::{ProjectConfig, ProjectPaths};
use crate::task::{
    Inputs, TaskError, TaskHandle, TransformRegistry, Unit, blocking, concurrent, sequence,
};
use anyhow::Result;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::path::Path;
use std::sync::Arc;

/// Prefix of every symbol id in the sprite.
pub const SYMBOL_PREFIX: &str = "i-";

/// Paint attributes removed from monochrome icons so they follow `currentColor`.
const PAINT_ATTRS: &[&[u8]] = &[b"fill", b"stroke", b"style"];

/// Root attributes carried over onto the sprite symbol.
const SYMBOL_ATTRS: &[&[u8]] = &[
    b"viewBox",
    b"preserveAspectRatio",
    b"fill",
    b"stroke",
    b"stroke-width",
    b"stroke-linecap",
    b"stroke-linejoin",
];

pub fn patterns(paths: &ProjectPaths) -> Vec<String> {
    vec![
        paths.pattern("icons/colorful/*.svg"),
        paths.pattern("icons/monochrome/*.svg"),
    ]
}

/// Register the icon tasks and return their composed sequence.
pub fn register(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<Unit> {
    let paths = config.paths();

    let prebuilt = paths.icons_prebuilt();
    let clean = reg.register("icons:clean", Inputs::None, move |_| {
        let prebuilt = prebuilt.clone();
        async move {
            clean::clean_dir(&prebuilt).await?;
            tokio::fs::create_dir_all(&prebuilt)
                .await
                .map_err(|e| TaskError::io(&prebuilt, e))?;
            Ok(Vec::new())
        }
    })?;

    let monochrome = register_normalizer(reg, &paths, "icons:monochrome", "monochrome", true)?;
    let colorful = register_normalizer(reg, &paths, "icons:colorful", "colorful", false)?;

    let sprite_target = paths.sprite();
    let styles_target = paths.sprite_styles();
    let sprite = reg.register(
        "icons:sprite",
        Inputs::globs([paths.pattern("icons/pre-built/*.svg")]),
        move |files| {
            let target = sprite_target.clone();
            let styles_target = styles_target.clone();
            async move {
                let mut icons = Vec::with_capacity(files.len());
                for file in &files {
                    icons.push((icon_name(file), output::read_to_string(file).await?));
                }
                let (sprite, styles) = blocking(move || {
                    let sprite = build_sprite(&icons).map_err(TaskError::Transform)?;
                    let styles = render_sprite_styles(&icons).map_err(TaskError::Transform)?;
                    Ok((sprite, styles))
                })
                .await?;
                output::write(&target, sprite).await?;
                output::write(&styles_target, styles).await?;
                Ok(vec![target, styles_target])
            }
        },
    )?;

    Ok(sequence(
        "icons",
        [
            clean.into(),
            concurrent("icons:normalize", [monochrome.into(), colorful.into()]),
            sprite.into(),
        ],
    ))
}

fn register_normalizer(
    reg: &mut TransformRegistry,
    paths: &ProjectPaths,
    name: &str,
    set: &str,
    strip_paint: bool,
) -> Result<TaskHandle> {
    let prebuilt = paths.icons_prebuilt();
    let inputs = Inputs::globs([paths.pattern(&format!("icons/{set}/*.svg"))]);
    reg.register(name, inputs, move |files| {
        let prebuilt = prebuilt.clone();
        async move {
            output::for_each_file(files, |file| {
                let target = prebuilt.join(file.file_name().unwrap_or_default());
                async move {
                    let svg = output::read_to_string(&file).await?;
                    let label = file.display().to_string();
                    let normalized = blocking(move || {
                        rewrite(&svg, strip_paint).map_err(|e| TaskError::Transform(format!("{label}: {e}")))
                    })
                    .await?;
                    output::write(&target, normalized).await?;
                    Ok(vec![target])
                }
            })
            .await
        }
    })
}

fn icon_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Re-serialize an SVG without comments, declarations or insignificant
/// whitespace, optionally dropping paint attributes.
pub fn rewrite(svg: &str, strip_paint: bool) -> Result<String, String> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new(Vec::new());

    loop {
        let event = reader.read_event().map_err(|e| e.to_string())?;
        let written = match event {
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::DocType(_) | Event::PI(_) => continue,
            Event::Start(e) if strip_paint => writer.write_event(Event::Start(without_paint(&e)?)),
            Event::Empty(e) if strip_paint => writer.write_event(Event::Empty(without_paint(&e)?)),
            other => writer.write_event(other),
        };
        written.map_err(|e| e.to_string())?;
    }

    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}

fn without_paint(element: &BytesStart<'_>) -> Result<BytesStart<'static>, String> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if !PAINT_ATTRS.contains(&attr.key.as_ref()) {
            out.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    Ok(out)
}

/// Assemble `(name, svg)` pairs into a hidden sprite of `<symbol>`s.
pub fn build_sprite(icons: &[(String, String)]) -> Result<String, String> {
    let mut writer = Writer::new(Vec::new());

    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    root.push_attribute(("style", "display:none"));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| e.to_string())?;

    for (name, svg) in icons {
        write_symbol(&mut writer, name, svg).map_err(|e| format!("{name}.svg: {e}"))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("svg")))
        .map_err(|e| e.to_string())?;
    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}

fn write_symbol(writer: &mut Writer<Vec<u8>>, name: &str, svg: &str) -> Result<(), String> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);

    // Depth inside the icon's root <svg>; 0 until the root opens.
    let mut depth = 0usize;
    loop {
        let event = reader.read_event().map_err(|e| e.to_string())?;
        match event {
            Event::Eof => {
                return Err(if depth == 0 {
                    "no <svg> root element".to_string()
                } else {
                    "unexpected end of document".to_string()
                });
            }
            Event::Start(e) if depth == 0 => {
                let symbol = symbol_start(name, &e)?;
                writer.write_event(Event::Start(symbol)).map_err(|e| e.to_string())?;
                depth = 1;
            }
            Event::Empty(e) if depth == 0 => {
                let symbol = symbol_start(name, &e)?;
                writer.write_event(Event::Empty(symbol)).map_err(|e| e.to_string())?;
                return Ok(());
            }
            Event::End(_) if depth == 1 => {
                writer
                    .write_event(Event::End(BytesEnd::new("symbol")))
                    .map_err(|e| e.to_string())?;
                return Ok(());
            }
            _ if depth == 0 => {}
            Event::Comment(_) | Event::Decl(_) | Event::DocType(_) | Event::PI(_) => {}
            other => {
                match &other {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => depth -= 1,
                    _ => {}
                }
                writer.write_event(other).map_err(|e| e.to_string())?;
            }
        }
    }
}

/// One size class per icon whose root `<svg>` declares its dimensions,
/// through `width`/`height` or else the `viewBox`.
pub fn render_sprite_styles(icons: &[(String, String)]) -> Result<String, String> {
    let mut out = String::new();
    for (name, svg) in icons {
        let Some((width, height)) = icon_dimensions(svg).map_err(|e| format!("{name}.svg: {e}"))? else {
            continue;
        };
        out.push_str(&format!(
            ".{SYMBOL_PREFIX}{name} {{\n  width: {width}px;\n  height: {height}px;\n}}\n"
        ));
    }
    Ok(out)
}

fn icon_dimensions(svg: &str) -> Result<Option<(f64, f64)>, String> {
    let mut reader = Reader::from_str(svg);
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(root) | Event::Empty(root) => return root_dimensions(&root),
            Event::Eof => return Err("no <svg> root element".to_string()),
            _ => {}
        }
    }
}

fn root_dimensions(root: &BytesStart<'_>) -> Result<Option<(f64, f64)>, String> {
    let mut width = None;
    let mut height = None;
    let mut view_box = None;
    for attr in root.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"width" => width = parse_length(&value),
            b"height" => height = parse_length(&value),
            b"viewBox" => view_box = Some(value),
            _ => {}
        }
    }

    if let (Some(w), Some(h)) = (width, height) {
        return Ok(Some((w, h)));
    }
    let Some(view_box) = view_box else {
        return Ok(None);
    };
    let numbers: Vec<f64> = view_box
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();
    Ok(match numbers.as_slice() {
        &[_, _, w, h] if w > 0.0 && h > 0.0 => Some((w, h)),
        _ => None,
    })
}

/// `24`, `24px` → 24; relative units are not usable as pixel sizes.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).parse().ok()
}

fn symbol_start(name: &str, root: &BytesStart<'_>) -> Result<BytesStart<'static>, String> {
    let mut symbol = BytesStart::new("symbol");
    symbol.push_attribute(("id", format!("{SYMBOL_PREFIX}{name}").as_str()));
    for attr in root.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if SYMBOL_ATTRS.contains(&attr.key.as_ref()) {
            symbol.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    Ok(symbol)
}
