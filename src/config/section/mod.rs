//! Configuration section definitions.

mod css;
mod images;
mod paths;
mod serve;
mod tools;
mod watch;

pub use css::CssConfig;
pub use images::ImagesConfig;
pub use paths::{PathsConfig, ProjectPaths};
pub use serve::ServeConfig;
pub use tools::ToolsConfig;
pub use watch::WatchConfig;
