//! `kiln build`: one production run.

use crate::config::ProjectConfig;
use crate::core::Profile;
use crate::pipeline::{Pipeline, run_profile};
use crate::task::Report;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::sync::Arc;

/// Run the build profile and return the process exit code.
pub async fn run(config: Arc<ProjectConfig>) -> Result<i32> {
    let pipeline = Pipeline::new(config)?;
    let report = run_profile(&pipeline, Profile::Build).await;
    print_failures(&report);
    Ok(exit_code(&report))
}

/// One message per failing transform.
pub fn print_failures(report: &Report) {
    for (task, error) in report.failures() {
        eprintln!("{} {}: {}", "✗".red(), task.bold(), error);
    }
}

pub fn exit_code(report: &Report) -> i32 {
    if report.is_success() { 0 } else { 1 }
}
