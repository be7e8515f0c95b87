use crate::reload::ReloadEvent;
use crate::task::{Inputs, Unit};
use std::path::Path;

/// Glob patterns whose changes re-run one unit.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    pub name: &'static str,
    pub inputs: Inputs,
    pub unit: Unit,
    /// Sent to viewers after a successful run; `None` means no reload.
    pub reload: Option<ReloadEvent>,
}

impl WatchBinding {
    pub fn new(name: &'static str, patterns: Vec<String>, unit: Unit) -> Self {
        Self {
            name,
            inputs: Inputs::Globs(patterns),
            unit,
            reload: None,
        }
    }

    pub fn reload(mut self, event: ReloadEvent) -> Self {
        self.reload = Some(event);
        self
    }

    /// Whether a change to `path` (absolute, under `root`) concerns this binding.
    pub fn matches(&self, root: &Path, path: &Path) -> bool {
        self.inputs.matches(root, path)
    }
}
