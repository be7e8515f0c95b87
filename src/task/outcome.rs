//! Leaf outcomes and the per-run report.

use super::TaskError;
use std::path::PathBuf;
use std::time::Duration;

/// Result of invoking one leaf task.
#[derive(Debug)]
pub enum Outcome {
    /// Transform ran; carries the paths it wrote.
    Success(Vec<PathBuf>),
    /// Declared inputs matched no files; the transform was not called.
    Skipped,
    Failure(TaskError),
}

impl Outcome {
    #[inline]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Skipped => "skipped",
            Self::Failure(_) => "failure",
        }
    }
}

/// One invoked leaf.
#[derive(Debug)]
pub struct LeafRecord {
    pub name: String,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

/// Every leaf invoked during one run of a unit, in completion order of
/// sequences and member order of concurrent groups.
#[derive(Debug, Default)]
pub struct Report {
    leaves: Vec<LeafRecord>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn push(&mut self, record: LeafRecord) {
        self.leaves.push(record);
    }

    pub fn extend(&mut self, other: Report) {
        self.leaves.extend(other.leaves);
    }

    /// Aggregate outcome: no invoked leaf failed.
    pub fn is_success(&self) -> bool {
        !self.leaves.iter().any(|l| l.outcome.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &TaskError)> {
        self.leaves.iter().filter_map(|l| match &l.outcome {
            Outcome::Failure(e) => Some((l.name.as_str(), e)),
            _ => None,
        })
    }

    /// How many times a leaf with this name was invoked.
    #[cfg(test)]
    pub fn invoked(&self, name: &str) -> usize {
        self.leaves.iter().filter(|l| l.name == name).count()
    }

    pub fn leaves(&self) -> &[LeafRecord] {
        &self.leaves
    }

    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.leaves
            .iter()
            .filter_map(|l| match &l.outcome {
                Outcome::Success(paths) => Some(paths),
                _ => None,
            })
            .flatten()
    }

    pub fn elapsed(&self) -> Duration {
        self.leaves.iter().map(|l| l.elapsed).sum()
    }
}

impl From<LeafRecord> for Report {
    fn from(record: LeafRecord) -> Self {
        Self {
            leaves: vec![record],
        }
    }
}
