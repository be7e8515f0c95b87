//! `kiln ttf`: convert `.otf` sources to `.ttf` in place.

use crate::config::ProjectConfig;
use crate::pipeline::fonts;
use crate::task::{TransformRegistry, executor};
use anyhow::Result;
use std::sync::Arc;

/// Run the standalone conversion and return the process exit code.
pub async fn run(config: Arc<ProjectConfig>) -> Result<i32> {
    let mut reg = TransformRegistry::new(&config.root);
    let task = fonts::register_otf2ttf(&mut reg, &config)?;

    let report = executor::run(&task.into()).await;
    if report.is_success() && report.outputs().count() == 0 {
        crate::log!("ttf"; "no .otf fonts found");
    }
    super::build::print_failures(&report);
    Ok(super::build::exit_code(&report))
}
