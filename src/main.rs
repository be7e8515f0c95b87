//! Kiln - a front-end asset build orchestrator.

mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod task;
mod utils;
mod watch;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;
use std::sync::Arc;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(ProjectConfig::load(&cli)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let code = runtime.block_on(async move {
        match cli.command() {
            Commands::Build => cli::build::run(config).await,
            Commands::Watch { .. } => cli::watch::run(config).await.map(|()| 0),
            Commands::Ttf => cli::ttf::run(config).await,
        }
    })?;

    // Blocking reload/http threads must not keep the process alive.
    runtime.shutdown_background();
    std::process::exit(code);
}
