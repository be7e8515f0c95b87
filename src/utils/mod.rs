//! Shared helpers for the asset pipeline and the dev server.

pub mod exec;
pub mod mime;
pub mod path;
pub mod plural;
