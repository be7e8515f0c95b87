//! `kiln watch`: development build, then stay resident.
//!
//! ```text
//! run_profile(Watch) ─► reload listener ─► dev server ─► fs watcher ─► WatchSession
//!                                                                     (until Ctrl+C)
//! ```

use crate::config::ProjectConfig;
use crate::core::{self, Profile};
use crate::pipeline::{Pipeline, run_profile};
use crate::reload::{self, ReloadNotifier};
use crate::serve;
use crate::watch::{self, WatchSession};
use anyhow::{Context, Result};
use std::sync::Arc;

pub async fn run(config: Arc<ProjectConfig>) -> Result<()> {
    let pipeline = Pipeline::new(Arc::clone(&config))?;
    let paths = config.paths();

    // A failing initial build still leaves the session running.
    let report = run_profile(&pipeline, Profile::Watch).await;
    super::build::print_failures(&report);

    let notifier = ReloadNotifier::new();
    let ws_port = reload::server::start(config.serve.interface, config.serve.ws_port, notifier.clone())
        .context("failed to start live reload listener")?;
    crate::debug!("reload"; "ws://{}:{}", config.serve.interface, ws_port);

    if config.serve.enable {
        let server = serve::start(&config.serve, paths.output(), Some(ws_port))?;
        core::register_server(server.handle());
    }

    let events = watch::source::spawn(vec![paths.source()]).context("failed to start file watcher")?;
    let session = WatchSession::new(&config.root, pipeline.into_bindings(), &config.watch, notifier);

    core::set_resident();
    crate::log!("watch"; "watching {} for changes", config.root_relative(paths.source()).display());

    tokio::select! {
        () = session.run(events) => {}
        () = core::wait_for_shutdown() => {}
    }
    Ok(())
}
