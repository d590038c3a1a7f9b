//! Task filtering by status, priority, and project.
//!
//! Each criterion is either `all` (unconstrained) or one concrete value. A
//! task passes when it equals every constrained criterion. Filtering is a pure
//! function of the task slice and keeps input order.

use std::fmt;

use crate::error::Result;
use crate::task::{Priority, Task, TaskStatus};

/// Text that means "no constraint"
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion<T> {
    All,
    Only(T),
}

impl<T> Default for Criterion<T> {
    fn default() -> Self {
        Criterion::All
    }
}

impl<T: PartialEq> Criterion<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Criterion::All => true,
            Criterion::Only(expected) => expected == value,
        }
    }
}

impl<T> Criterion<T> {
    /// Parse `all` or a concrete value with `parse`.
    pub fn parse_with<F>(raw: &str, parse: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            return Ok(Criterion::All);
        }
        parse(trimmed).map(Criterion::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Criterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::All => f.write_str(ALL),
            Criterion::Only(value) => value.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Criterion<TaskStatus>,
    pub priority: Criterion<Priority>,
    pub project: Criterion<String>,
}

impl TaskFilter {
    /// The unconstrained filter
    pub fn all() -> Self {
        Self::default()
    }

    /// Build from the textual form used by views (`all` or a value each).
    pub fn parse(status: &str, priority: &str, project: &str) -> Result<Self> {
        Ok(Self {
            status: Criterion::parse_with(status, str::parse::<TaskStatus>)?,
            priority: Criterion::parse_with(priority, str::parse::<Priority>)?,
            project: Criterion::parse_with(project, |id| Ok(id.to_string()))?,
        })
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Criterion::Only(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Criterion::Only(priority);
        self
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project = Criterion::Only(project_id.into());
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(&task.status)
            && self.priority.matches(&task.priority)
            && self.project.matches(&task.project_id)
    }
}

/// Tasks passing `filter`, in input order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}
