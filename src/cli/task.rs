//! taskdeck task command implementations.

use serde::Serialize;

use super::StoreContext;
use crate::error::{Error, Result};
use crate::filter::TaskFilter;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{parse_due_date, NewTask, Priority, Task, TaskUpdate};
use crate::tracker::Tracker;

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub project: Option<String>,
}

pub struct ListOptions {
    pub status: String,
    pub priority: String,
    pub project: String,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub project: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct FilterOutput {
    status: String,
    priority: String,
    project: String,
}

#[derive(Serialize)]
pub(crate) struct TaskListOutput<'a> {
    total: usize,
    filter: FilterOutput,
    tasks: Vec<&'a Task>,
}

pub fn run_add(ctx: &StoreContext, options: AddOptions, output: OutputOptions) -> Result<()> {
    let mut tracker = ctx.open_tracker();

    let mut input = NewTask::new(options.title);
    if let Some(description) = options.description {
        input = input.description(description);
    }
    if let Some(priority) = options.priority.as_deref() {
        input = input.priority(priority.parse::<Priority>()?);
    }
    if let Some(due) = options.due.as_deref() {
        input = input.due_date(parse_due_date(due)?);
    }
    if let Some(project) = options.project {
        input = input.project(project);
    }

    let task = tracker.create_task(input)?;
    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &tracker, &task);
    emit_success(output, "task add", &task, Some(&human))
}

pub fn run_list(ctx: &StoreContext, options: ListOptions, output: OutputOptions) -> Result<()> {
    let tracker = ctx.open_tracker();
    let filter = TaskFilter::parse(&options.status, &options.priority, &options.project)?;
    emit_list(&tracker, &filter, "task list", output)
}

pub fn run_edit(ctx: &StoreContext, options: EditOptions, output: OutputOptions) -> Result<()> {
    let mut tracker = ctx.open_tracker();

    let due_date = if options.clear_due {
        Some(None)
    } else {
        options
            .due
            .as_deref()
            .map(parse_due_date)
            .transpose()?
            .map(Some)
    };
    let update = TaskUpdate {
        title: options.title,
        description: options.description,
        priority: options
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        due_date,
        project_id: options.project,
    };
    if update.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass at least one field".to_string(),
        ));
    }

    let task = tracker.update_task(&options.id, update)?;
    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &tracker, &task);
    emit_success(output, "task edit", &task, Some(&human))
}

pub fn run_toggle(ctx: &StoreContext, id: &str, output: OutputOptions) -> Result<()> {
    let mut tracker = ctx.open_tracker();
    let task = tracker.toggle_status(id)?;
    let header = if task.is_completed() {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    push_task_summary(&mut human, &tracker, &task);
    emit_success(output, "task toggle", &task, Some(&human))
}

pub fn run_delete(ctx: &StoreContext, id: &str, output: OutputOptions) -> Result<()> {
    let mut tracker = ctx.open_tracker();
    let task = tracker.delete_task(id)?;
    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    emit_success(output, "task delete", &task, Some(&human))
}

/// Shared by `task list` and every `watch` frame.
pub(crate) fn emit_list(
    tracker: &Tracker,
    filter: &TaskFilter,
    command: &str,
    output: OutputOptions,
) -> Result<()> {
    let tasks = tracker.visible_tasks(filter);
    let data = TaskListOutput {
        total: tasks.len(),
        filter: FilterOutput {
            status: filter.status.to_string(),
            priority: filter.priority.to_string(),
            project: filter.project.to_string(),
        },
        tasks,
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", data.total.to_string());
    for task in &data.tasks {
        human.push_detail(task_line(tracker, task));
    }
    let orphaned = tracker.orphaned_tasks().len();
    if orphaned > 0 {
        human.push_warning(format!(
            "{orphaned} task(s) reference a deleted project and are shown under General"
        ));
    }
    emit_success(output, command, &data, Some(&human))
}

fn task_line(tracker: &Tracker, task: &Task) -> String {
    let mark = if task.is_completed() { "x" } else { " " };
    let project = tracker.project_for(task);
    let mut line = format!(
        "[{mark}] {} ({}, {}) {}",
        task.title, task.priority, project.name, task.id
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {due}"));
    }
    line
}

fn push_task_summary(human: &mut HumanOutput, tracker: &Tracker, task: &Task) {
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", task.status.to_string());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Project", tracker.project_for(task).name);
    if let Some(due) = task.due_date {
        human.push_summary("Due", due.to_string());
    }
}
