//! Build profiles.

/// Which transform variants a run uses and whether it stays resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// One-shot production build: minified, prefixed output.
    Build,
    /// Development build followed by the resident watch session.
    Watch,
}

impl Profile {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Watch => "watch",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
