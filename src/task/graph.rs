//! Composition of leaf tasks into runnable units.
//!
//! Pure data: building a unit never executes anything.

use super::TaskHandle;

/// A runnable node: a leaf task, an ordered sequence, or a concurrent group.
#[derive(Debug, Clone)]
pub enum Unit {
    Task(TaskHandle),
    /// Members run one after another; the first failure aborts the rest.
    Sequence { name: String, members: Vec<Unit> },
    /// Members start together; a failure never cancels siblings.
    Concurrent { name: String, members: Vec<Unit> },
}

impl Unit {
    pub fn task(handle: TaskHandle) -> Self {
        Self::Task(handle)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Task(handle) => handle.name(),
            Self::Sequence { name, .. } | Self::Concurrent { name, .. } => name,
        }
    }

    /// All leaves reachable from this unit, in declaration order.
    pub fn leaves(&self) -> Vec<&TaskHandle> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TaskHandle>) {
        match self {
            Self::Task(handle) => out.push(handle),
            Self::Sequence { members, .. } | Self::Concurrent { members, .. } => {
                for member in members {
                    member.collect_leaves(out);
                }
            }
        }
    }
}

impl From<TaskHandle> for Unit {
    fn from(handle: TaskHandle) -> Self {
        Self::Task(handle)
    }
}

pub fn sequence(name: impl Into<String>, units: impl IntoIterator<Item = Unit>) -> Unit {
    Unit::Sequence {
        name: name.into(),
        members: units.into_iter().collect(),
    }
}

pub fn concurrent(name: impl Into<String>, units: impl IntoIterator<Item = Unit>) -> Unit {
    Unit::Concurrent {
        name: name.into(),
        members: units.into_iter().collect(),
    }
}

/// Stable identity of a concurrent-group member, used in logs.
pub fn member_id(group: &str, index: usize, member: &Unit) -> String {
    format!("{group}/{index}:{}", member.name())
}
