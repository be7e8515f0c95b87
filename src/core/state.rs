//! Process-wide shutdown state.
//!
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//! - `RESIDENT`: Is a watch session running that should wind down itself?

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use tiny_http::Server;
use tokio::sync::Notify;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// A resident session owns shutdown; before that, Ctrl+C exits at once.
static RESIDENT: AtomicBool = AtomicBool::new(false);

/// Wakes the resident session.
static SHUTDOWN_NOTIFY: LazyLock<Notify> = LazyLock::new(Notify::new);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `set_resident()`: exit immediately with status 0
/// - After `set_resident()`: unblock the dev server and wake the session
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if !RESIDENT.load(Ordering::SeqCst) {
            std::process::exit(0);
        }

        crate::log!("watch"; "shutting down...");
        if let Some(server) = SERVER.get() {
            server.unblock();
        }
        SHUTDOWN_NOTIFY.notify_one();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Hand shutdown over to the resident watch session.
pub fn set_resident() {
    RESIDENT.store(true, Ordering::SeqCst);
}

/// Register the HTTP server for graceful shutdown
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Resolve once Ctrl+C has been received.
pub async fn wait_for_shutdown() {
    if is_shutdown() {
        return;
    }
    SHUTDOWN_NOTIFY.notified().await;
}

// =============================================================================
// Tests
// =============================================================================
