//! Asset pipeline: leaf transforms and the graphs built from them.
//!
//! Every transform registers into one [`TransformRegistry`]; [`Pipeline`]
//! then composes the two profile graphs and the watch bindings from the
//! resulting handles.
//!
//! ```text
//! build = clean ─► ┌ html        ┐
//!                  │ css:prod    │
//!                  │ js:prod     │
//!                  │ icons (seq) │
//!                  │ img         │
//!                  │ resources   │
//!                  └ fonts (seq) ┘
//! ```
//!
//! `watch` is the same graph with `css:dev` and `js:dev`.

pub mod clean;
pub mod fonts;
pub mod icons;
pub mod images;
pub mod markup;
pub mod minify;
pub mod output;
mod profile;
pub mod resources;
pub mod scripts;
pub mod styles;

#[cfg(test)]
mod tests;

pub use profile::run_profile;

use crate::config::ProjectConfig;
use crate::core::Profile;
use crate::reload::ReloadEvent;
use crate::task::{TransformRegistry, Unit, concurrent, sequence};
use crate::watch::WatchBinding;
use anyhow::Result;
use std::sync::Arc;

/// Registered transforms, the two profile graphs and the watch bindings.
pub struct Pipeline {
    pub registry: TransformRegistry,
    build: Unit,
    watch: Unit,
    bindings: Vec<WatchBinding>,
}

impl Pipeline {
    pub fn new(config: Arc<ProjectConfig>) -> Result<Self> {
        let paths = config.paths();
        let mut reg = TransformRegistry::new(&config.root);

        let clean = clean::register(&mut reg, &config)?;
        let html = markup::register(&mut reg, &config)?;
        let css_prod = styles::register_prod(&mut reg, &config)?;
        let css_dev = styles::register_dev(&mut reg, &config)?;
        let js_prod = scripts::register_prod(&mut reg, &config)?;
        let js_dev = scripts::register_dev(&mut reg, &config)?;
        let icons = icons::register(&mut reg, &config)?;
        let img = images::register(&mut reg, &config)?;
        let resources = resources::register(&mut reg, &config)?;
        let fonts = fonts::register(&mut reg, &config)?;

        let graph = |name: &str, css: Unit, js: Unit| {
            sequence(
                name,
                [
                    clean.clone().into(),
                    concurrent(
                        format!("{name}:transforms"),
                        [
                            html.clone().into(),
                            css,
                            js,
                            icons.clone(),
                            img.clone().into(),
                            resources.clone().into(),
                            fonts.clone(),
                        ],
                    ),
                ],
            )
        };
        let build = graph("build", css_prod.into(), js_prod.into());
        let watch = graph("watch", css_dev.clone().into(), js_dev.clone().into());

        let stylesheet = styles::css_target(&config, &paths.style_entry());
        let bindings = vec![
            WatchBinding::new(
                "markup",
                vec![
                    paths.pattern("*.html"),
                    paths.pattern("components/**/*.html"),
                    paths.pattern("pages/**/*.html"),
                ],
                html.into(),
            )
            .reload(ReloadEvent::FullReload),
            WatchBinding::new("styles", vec![paths.pattern("scss/**/*.scss")], css_dev.into())
                .reload(ReloadEvent::StyleInject(paths.output_relative(&stylesheet))),
            WatchBinding::new("scripts", scripts::patterns(&paths), js_dev.into())
                .reload(ReloadEvent::FullReload),
            WatchBinding::new("images", images::patterns(&paths), img.into())
                .reload(ReloadEvent::FullReload),
            WatchBinding::new("resources", resources::patterns(&paths), resources.into()),
            WatchBinding::new("icons", icons::patterns(&paths), icons)
                .reload(ReloadEvent::FullReload),
            WatchBinding::new("fonts", fonts::patterns(&paths), fonts)
                .reload(ReloadEvent::FullReload),
        ];

        Ok(Self {
            registry: reg,
            build,
            watch,
            bindings,
        })
    }

    /// The composed graph for `profile`.
    pub fn graph(&self, profile: Profile) -> &Unit {
        match profile {
            Profile::Build => &self.build,
            Profile::Watch => &self.watch,
        }
    }

    #[cfg(test)]
    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    /// Hand the bindings over to a watch session.
    pub fn into_bindings(self) -> Vec<WatchBinding> {
        self.bindings
    }
}
