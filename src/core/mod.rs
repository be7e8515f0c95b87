//! Core types shared across the codebase.

mod profile;
mod state;

pub use profile::Profile;
pub use state::{
    is_shutdown, register_server, set_resident, setup_shutdown_handler, wait_for_shutdown,
};
