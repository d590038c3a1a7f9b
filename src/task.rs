//! Tasks and the task repository.
//!
//! The repository keeps the canonical in-memory copy of the Task collection
//! for one load cycle. Every mutation builds the next collection, persists it
//! as a whole under [`TASKS_KEY`], and only then replaces the in-memory copy,
//! so a failed write leaves memory and store in agreement.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::id::{generate_id, touch};
use crate::project::DEFAULT_PROJECT_ID;
use crate::storage::{Storage, TASKS_KEY};

/// Calendar format of `dueDate`
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "unknown task status '{trimmed}' (expected pending|completed)"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "unknown priority '{trimmed}' (expected low|medium|high)"
                ))
            })
    }
}

/// Parse a `YYYY-MM-DD` due date.
pub fn parse_due_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT).map_err(|err| {
        Error::Validation(format!("invalid due date '{trimmed}' (expected YYYY-MM-DD): {err}"))
    })
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

/// Stored due dates may be blank, a calendar date, or a full timestamp.
/// Anything else is dropped rather than failing the whole collection.
fn deserialize_due_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT) {
        return Ok(Some(date));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(timestamp.date_naive()));
    }
    tracing::warn!(due_date = trimmed, "dropping unparseable due date");
    Ok(None)
}

/// One actionable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(
        default,
        deserialize_with = "deserialize_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_project_id")]
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Input for [`TaskRepository::create`]. Only the title is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

/// Fields to merge into an existing task. `None` leaves a field unchanged;
/// `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub project_id: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.project_id.is_none()
    }
}

fn required_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("task title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn project_or_default(project_id: Option<&str>) -> String {
    match project_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => default_project_id(),
    }
}

#[derive(Debug, Clone)]
pub struct TaskRepository {
    storage: Storage,
    tasks: Vec<Task>,
}

impl TaskRepository {
    /// Load the Task collection. Absent or corrupt data loads as empty.
    pub fn load(storage: Storage) -> Self {
        let tasks = storage.read_collection(TASKS_KEY);
        Self { storage, tasks }
    }

    /// Discard the in-memory copy and re-read the store.
    pub fn reload(&mut self) -> &[Task] {
        self.tasks = self.storage.read_collection(TASKS_KEY);
        &self.tasks
    }

    /// Tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn create(&mut self, input: NewTask) -> Result<Task> {
        let title = required_title(&input.title)?;
        let now = Utc::now();
        let task = Task {
            id: generate_id(self.tasks.iter().map(|task| task.id.as_str())),
            title,
            description: input
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            status: TaskStatus::Pending,
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            project_id: project_or_default(input.project_id.as_deref()),
            created_at: now,
            updated_at: now,
        };

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.persist(next)?;
        tracing::debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    pub fn update(&mut self, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let index = self.index_of(task_id)?;
        let mut task = self.tasks[index].clone();

        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description.as_deref() {
            task.description = description.trim().to_string();
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(project_id) = update.project_id.as_deref() {
            task.project_id = project_or_default(Some(project_id));
        }
        // Checked after the merge: stored records may already be blank.
        task.title = required_title(&task.title)?;
        task.updated_at = touch(task.updated_at);

        self.replace_at(index, task)
    }

    /// Flip pending <-> completed.
    pub fn toggle_status(&mut self, task_id: &str) -> Result<Task> {
        let index = self.index_of(task_id)?;
        let mut task = self.tasks[index].clone();
        task.status = task.status.toggled();
        task.updated_at = touch(task.updated_at);
        self.replace_at(index, task)
    }

    pub fn delete(&mut self, task_id: &str) -> Result<Task> {
        let index = self.index_of(task_id)?;
        let mut next = self.tasks.clone();
        let removed = next.remove(index);
        self.persist(next)?;
        tracing::debug!(task_id, "task deleted");
        Ok(removed)
    }

    /// Move every task owned by `from` to `to`, refreshing `updatedAt` on each
    /// moved task. Returns how many moved; persists only when some did.
    pub fn reassign_project(&mut self, from: &str, to: &str) -> Result<usize> {
        let mut moved = 0;
        let next: Vec<Task> = self
            .tasks
            .iter()
            .cloned()
            .map(|mut task| {
                if task.project_id == from {
                    task.project_id = to.to_string();
                    task.updated_at = touch(task.updated_at);
                    moved += 1;
                }
                task
            })
            .collect();

        if moved > 0 {
            self.persist(next)?;
        }
        Ok(moved)
    }

    fn index_of(&self, task_id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    fn replace_at(&mut self, index: usize, task: Task) -> Result<Task> {
        let mut next = self.tasks.clone();
        next[index] = task.clone();
        self.persist(next)?;
        Ok(task)
    }

    fn persist(&mut self, next: Vec<Task>) -> Result<()> {
        self.storage.write_collection(TASKS_KEY, &next)?;
        self.tasks = next;
        Ok(())
    }
}
