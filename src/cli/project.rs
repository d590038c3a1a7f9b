//! taskdeck project command implementations.

use serde::Serialize;

use super::StoreContext;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::project::{Project, ProjectColor, DEFAULT_PROJECT_ID};

pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Serialize)]
struct ProjectEntry<'a> {
    #[serde(flatten)]
    project: &'a Project,
    task_count: usize,
}

#[derive(Serialize)]
struct ProjectListOutput<'a> {
    total: usize,
    projects: Vec<ProjectEntry<'a>>,
}

pub fn run_add(
    ctx: &StoreContext,
    name: &str,
    color: Option<&str>,
    output: OutputOptions,
) -> Result<()> {
    let mut tracker = ctx.open_tracker();
    let color = color
        .map(str::parse::<ProjectColor>)
        .transpose()?
        .unwrap_or_default();
    let project = tracker.create_project(name, color)?;

    let mut human = HumanOutput::new("Project created");
    push_project_summary(&mut human, &project);
    emit_success(output, "project add", &project, Some(&human))
}

pub fn run_list(ctx: &StoreContext, output: OutputOptions) -> Result<()> {
    let tracker = ctx.open_tracker();
    let projects: Vec<ProjectEntry<'_>> = tracker
        .task_counts()
        .into_iter()
        .map(|(project, task_count)| ProjectEntry {
            project,
            task_count,
        })
        .collect();
    let data = ProjectListOutput {
        total: projects.len(),
        projects,
    };

    let mut human = HumanOutput::new("Projects");
    human.push_summary("Total", data.total.to_string());
    for entry in &data.projects {
        human.push_detail(format!(
            "{} {} [{}] {} task(s)",
            entry.project.id,
            entry.project.name,
            entry.project.color.display_name(),
            entry.task_count
        ));
    }
    emit_success(output, "project list", &data, Some(&human))
}

pub fn run_edit(ctx: &StoreContext, options: EditOptions, output: OutputOptions) -> Result<()> {
    if options.name.is_none() && options.color.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass --name and/or --color".to_string(),
        ));
    }

    let mut tracker = ctx.open_tracker();
    let current = tracker
        .project(&options.id)
        .cloned()
        .ok_or_else(|| Error::ProjectNotFound(options.id.clone()))?;
    let name = options.name.unwrap_or(current.name);
    let color = match options.color.as_deref() {
        Some(raw) => raw.parse::<ProjectColor>()?,
        None => current.color,
    };
    let project = tracker.rename_or_recolor(&options.id, &name, color)?;

    let mut human = HumanOutput::new("Project updated");
    push_project_summary(&mut human, &project);
    emit_success(output, "project edit", &project, Some(&human))
}

pub fn run_delete(ctx: &StoreContext, id: &str, output: OutputOptions) -> Result<()> {
    let mut tracker = ctx.open_tracker();
    let deletion = tracker.delete_project(id)?;

    let mut human = HumanOutput::new("Project deleted");
    human.push_summary("ID", deletion.project.id.clone());
    human.push_summary("Name", deletion.project.name.clone());
    human.push_summary("Tasks moved to General", deletion.reassigned_tasks.to_string());
    if deletion.reassigned_tasks > 0 {
        human.push_next_step(format!("taskdeck task list --project {DEFAULT_PROJECT_ID}"));
    }
    emit_success(output, "project delete", &deletion, Some(&human))
}

fn push_project_summary(human: &mut HumanOutput, project: &Project) {
    human.push_summary("ID", project.id.clone());
    human.push_summary("Name", project.name.clone());
    human.push_summary("Color", project.color.display_name());
}
