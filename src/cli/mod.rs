//! Command-line interface module.

mod args;
pub mod build;
pub mod ttf;
pub mod watch;

pub use args::{Cli, Commands, WatchArgs};
