//! Dashboard counts derived from the collections.

use std::collections::HashMap;

use serde::Serialize;

use crate::project::Project;
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_tasks: usize,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
    pub projects: usize,
}

pub fn summarize(tasks: &[Task], projects: &[Project]) -> Summary {
    let pending_tasks = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .count();
    Summary {
        total_tasks: tasks.len(),
        pending_tasks,
        completed_tasks: tasks.len() - pending_tasks,
        projects: projects.len(),
    }
}

/// Task count per project, in project order. Projects without tasks get 0;
/// tasks whose project is missing are not counted.
pub fn task_counts_by_project<'a>(tasks: &[Task], projects: &'a [Project]) -> Vec<(&'a Project, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for task in tasks {
        *counts.entry(task.project_id.as_str()).or_insert(0) += 1;
    }
    projects
        .iter()
        .map(|project| (project, counts.get(project.id.as_str()).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ProjectColor, DEFAULT_PROJECT_ID};
    use chrono::Utc;

    fn task(project: &str, status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: format!("{project}-{status}-{}", now.timestamp_nanos_opt().unwrap_or_default()),
            title: "t".to_string(),
            description: String::new(),
            status,
            priority: Default::default(),
            due_date: None,
            project_id: project.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn projects() -> Vec<Project> {
        vec![
            Project::default_project(),
            Project {
                id: "work".to_string(),
                name: "Work".to_string(),
                color: ProjectColor::Blue,
                created_at: Some(Utc::now()),
            },
            Project {
                id: "idle".to_string(),
                name: "Idle".to_string(),
                color: ProjectColor::Teal,
                created_at: Some(Utc::now()),
            },
        ]
    }

    #[test]
    fn summary_counts_statuses() {
        let tasks = vec![
            task(DEFAULT_PROJECT_ID, TaskStatus::Pending),
            task("work", TaskStatus::Completed),
            task("work", TaskStatus::Pending),
        ];
        let summary = summarize(&tasks, &projects());
        assert_eq!(
            summary,
            Summary {
                total_tasks: 3,
                pending_tasks: 2,
                completed_tasks: 1,
                projects: 3,
            }
        );
    }

    #[test]
    fn counts_cover_every_project() {
        let tasks = vec![
            task("work", TaskStatus::Pending),
            task("work", TaskStatus::Completed),
            task("ghost", TaskStatus::Pending),
        ];
        let projects = projects();
        let counts: Vec<(&str, usize)> = task_counts_by_project(&tasks, &projects)
            .into_iter()
            .map(|(project, count)| (project.id.as_str(), count))
            .collect();
        assert_eq!(counts, vec![(DEFAULT_PROJECT_ID, 0), ("work", 2), ("idle", 0)]);
    }
}
