//! Session facade over both repositories.
//!
//! A [`Tracker`] is one browsing context: it owns an in-memory copy of the
//! task and project collections, writes through to the shared store, and
//! listens on the store's change bus so it can re-read after another context
//! writes.

use crate::error::{Error, Result};
use crate::events::Subscription;
use crate::filter::{filter_tasks, TaskFilter};
use crate::project::{Project, ProjectColor, ProjectDeletion, ProjectRepository};
use crate::stats::{summarize, task_counts_by_project, Summary};
use crate::storage::Storage;
use crate::task::{NewTask, Task, TaskRepository, TaskUpdate};

#[derive(Debug)]
pub struct Tracker {
    storage: Storage,
    projects: ProjectRepository,
    tasks: TaskRepository,
    subscription: Subscription,
}

impl Tracker {
    /// Load projects (seeding the default) then tasks, and start listening.
    pub fn open(storage: Storage) -> Self {
        let subscription = storage.bus().subscribe();
        let mut projects = ProjectRepository::load(storage.clone());
        // Only the seed echo is discarded. Every read below happens after
        // the drain, so a racing write is either seen or still pending.
        subscription.drain();
        projects.reload();
        let tasks = TaskRepository::load(storage.clone());

        tracing::debug!(
            tasks = tasks.tasks().len(),
            projects = projects.projects().len(),
            "tracker opened"
        );
        Self {
            storage,
            projects,
            tasks,
            subscription,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn projects(&self) -> &[Project] {
        self.projects.projects()
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.get(project_id)
    }

    pub fn create_task(&mut self, input: NewTask) -> Result<Task> {
        if let Some(project_id) = input.project_id.as_deref() {
            self.require_project(project_id)?;
        }
        self.tasks.create(input)
    }

    pub fn update_task(&mut self, task_id: &str, update: TaskUpdate) -> Result<Task> {
        if let Some(project_id) = update.project_id.as_deref() {
            self.require_project(project_id)?;
        }
        self.tasks.update(task_id, update)
    }

    pub fn toggle_status(&mut self, task_id: &str) -> Result<Task> {
        self.tasks.toggle_status(task_id)
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<Task> {
        self.tasks.delete(task_id)
    }

    pub fn create_project(&mut self, name: &str, color: ProjectColor) -> Result<Project> {
        self.projects.create(name, color)
    }

    pub fn rename_or_recolor(
        &mut self,
        project_id: &str,
        name: &str,
        color: ProjectColor,
    ) -> Result<Project> {
        self.projects.rename_or_recolor(project_id, name, color)
    }

    pub fn delete_project(&mut self, project_id: &str) -> Result<ProjectDeletion> {
        self.projects.delete(project_id, &mut self.tasks)
    }

    /// Apply pending change notifications.
    ///
    /// Returns true when at least one notification was pending, in which
    /// case both collections were re-read.
    pub fn sync(&mut self) -> bool {
        let pending = self.subscription.drain();
        if pending == 0 {
            return false;
        }
        tracing::debug!(pending, "store changed; reloading");
        self.reload();
        true
    }

    /// Re-read both collections regardless of notifications.
    pub fn reload(&mut self) {
        self.projects.reload();
        self.tasks.reload();
    }

    /// Wait up to `timeout` for a change, then sync.
    pub fn wait_for_change(&mut self, timeout: std::time::Duration) -> bool {
        if !self.subscription.wait(timeout) {
            return false;
        }
        self.subscription.drain();
        self.reload();
        true
    }

    /// Owning project of `task`; the default project if it no longer exists.
    pub fn project_for(&self, task: &Task) -> Project {
        self.projects.resolve(&task.project_id)
    }

    pub fn visible_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        filter_tasks(self.tasks.tasks(), filter)
    }

    /// Tasks whose project id resolves to nothing.
    pub fn orphaned_tasks(&self) -> Vec<&Task> {
        self.tasks
            .tasks()
            .iter()
            .filter(|task| !self.projects.contains(&task.project_id))
            .collect()
    }

    pub fn summary(&self) -> Summary {
        summarize(self.tasks.tasks(), self.projects.projects())
    }

    pub fn task_counts(&self) -> Vec<(&Project, usize)> {
        task_counts_by_project(self.tasks.tasks(), self.projects.projects())
    }

    fn require_project(&self, project_id: &str) -> Result<()> {
        let trimmed = project_id.trim();
        // Blank means "default" to the repository.
        if trimmed.is_empty() || self.projects.contains(trimmed) {
            Ok(())
        } else {
            Err(Error::ProjectNotFound(trimmed.to_string()))
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.storage.bus().unsubscribe(self.subscription.id());
    }
}
