//! Projects and the project repository.
//!
//! Projects are named, coloured groupings of tasks. The project with id
//! [`DEFAULT_PROJECT_ID`] ("General") always exists: it is seeded the first
//! time an empty collection is loaded and can never be deleted. Deleting any
//! other project moves its tasks to the default project.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::generate_id;
use crate::storage::{Storage, PROJECTS_KEY};
use crate::task::TaskRepository;

/// Reserved id of the built-in project
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Name of the built-in project
pub const DEFAULT_PROJECT_NAME: &str = "General";

/// Display colour of a project. The first palette entry is the default.
///
/// Older stores saved the stylesheet class instead of the colour name; both
/// decode to the same colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectColor {
    #[default]
    #[serde(alias = "bg-primary")]
    Maroon,
    #[serde(alias = "bg-secondary")]
    Green,
    #[serde(alias = "bg-accent")]
    Orange,
    #[serde(alias = "bg-blue-600")]
    Blue,
    #[serde(alias = "bg-purple-600")]
    Purple,
    #[serde(alias = "bg-teal-600")]
    Teal,
}

impl ProjectColor {
    pub const PALETTE: [ProjectColor; 6] = [
        ProjectColor::Maroon,
        ProjectColor::Green,
        ProjectColor::Orange,
        ProjectColor::Blue,
        ProjectColor::Purple,
        ProjectColor::Teal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectColor::Maroon => "maroon",
            ProjectColor::Green => "green",
            ProjectColor::Orange => "orange",
            ProjectColor::Blue => "blue",
            ProjectColor::Purple => "purple",
            ProjectColor::Teal => "teal",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProjectColor::Maroon => "Maroon",
            ProjectColor::Green => "Green",
            ProjectColor::Orange => "Orange",
            ProjectColor::Blue => "Blue",
            ProjectColor::Purple => "Purple",
            ProjectColor::Teal => "Teal",
        }
    }

    fn legacy_class(self) -> &'static str {
        match self {
            ProjectColor::Maroon => "bg-primary",
            ProjectColor::Green => "bg-secondary",
            ProjectColor::Orange => "bg-accent",
            ProjectColor::Blue => "bg-blue-600",
            ProjectColor::Purple => "bg-purple-600",
            ProjectColor::Teal => "bg-teal-600",
        }
    }
}

impl fmt::Display for ProjectColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        ProjectColor::PALETTE
            .into_iter()
            .find(|color| {
                color.as_str().eq_ignore_ascii_case(trimmed)
                    || color.legacy_class().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| {
                let names: Vec<&str> = ProjectColor::PALETTE
                    .iter()
                    .map(|color| color.as_str())
                    .collect();
                Error::Validation(format!(
                    "unknown project color '{trimmed}' (expected {})",
                    names.join("|")
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: ProjectColor,
    /// Absent for the seeded default project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    /// The built-in "General" project
    pub fn default_project() -> Self {
        Self {
            id: DEFAULT_PROJECT_ID.to_string(),
            name: DEFAULT_PROJECT_NAME.to_string(),
            color: ProjectColor::default(),
            created_at: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PROJECT_ID
    }
}

/// Result of a successful project deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDeletion {
    pub project: Project,
    pub reassigned_tasks: usize,
}

fn required_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("project name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone)]
pub struct ProjectRepository {
    storage: Storage,
    projects: Vec<Project>,
}

impl ProjectRepository {
    /// Load the Project collection, seeding the default project if needed.
    pub fn load(storage: Storage) -> Self {
        let mut repo = Self {
            storage,
            projects: Vec::new(),
        };
        repo.reload();
        repo
    }

    /// Re-read the store, seeding the default project if needed.
    ///
    /// An empty collection becomes `[General]`; a non-empty collection that
    /// lost the default project gets it back in first position. The seed is
    /// persisted immediately. If that write fails the seed is still kept in
    /// memory and the next successful write stores it.
    pub fn reload(&mut self) -> &[Project] {
        let mut projects: Vec<Project> = self.storage.read_collection(PROJECTS_KEY);
        if !projects.iter().any(Project::is_default) {
            projects.insert(0, Project::default_project());
            match self.storage.write_collection(PROJECTS_KEY, &projects) {
                Ok(()) => tracing::info!("seeded default project"),
                Err(err) => tracing::warn!(error = %err, "failed to persist default project seed"),
            }
        }
        self.projects = projects;
        &self.projects
    }

    /// Projects in insertion order; never empty
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    pub fn contains(&self, project_id: &str) -> bool {
        self.get(project_id).is_some()
    }

    /// The project with `project_id`, or the default project when the id
    /// no longer resolves.
    pub fn resolve(&self, project_id: &str) -> Project {
        self.get(project_id)
            .or_else(|| self.get(DEFAULT_PROJECT_ID))
            .cloned()
            .unwrap_or_else(Project::default_project)
    }

    pub fn create(&mut self, name: &str, color: ProjectColor) -> Result<Project> {
        let name = required_name(name)?;
        let project = Project {
            id: generate_id(
                self.projects
                    .iter()
                    .map(|project| project.id.as_str())
                    .chain(std::iter::once(DEFAULT_PROJECT_ID)),
            ),
            name,
            color,
            created_at: Some(Utc::now()),
        };

        let mut next = self.projects.clone();
        next.push(project.clone());
        self.persist(next)?;
        tracing::debug!(project_id = %project.id, "project created");
        Ok(project)
    }

    /// Replace name and colour in place; id and creation time are kept.
    pub fn rename_or_recolor(
        &mut self,
        project_id: &str,
        name: &str,
        color: ProjectColor,
    ) -> Result<Project> {
        let index = self.index_of(project_id)?;
        let name = required_name(name)?;

        let mut next = self.projects.clone();
        next[index].name = name;
        next[index].color = color;
        let project = next[index].clone();
        self.persist(next)?;
        Ok(project)
    }

    /// Delete a project and move its tasks to the default project.
    ///
    /// Both collections are re-read first, so tasks another view assigned to
    /// the project are reassigned too. Tasks are persisted before the project
    /// is removed, so an interrupted deletion never leaves tasks pointing at
    /// a missing project.
    pub fn delete(&mut self, project_id: &str, tasks: &mut TaskRepository) -> Result<ProjectDeletion> {
        if project_id == DEFAULT_PROJECT_ID {
            return Err(Error::ProtectedProject(project_id.to_string()));
        }
        self.reload();
        tasks.reload();
        let index = self.index_of(project_id)?;

        let reassigned_tasks = tasks.reassign_project(project_id, DEFAULT_PROJECT_ID)?;

        let mut next = self.projects.clone();
        let project = next.remove(index);
        self.persist(next)?;

        tracing::info!(project_id, reassigned_tasks, "project deleted");
        Ok(ProjectDeletion {
            project,
            reassigned_tasks,
        })
    }

    fn index_of(&self, project_id: &str) -> Result<usize> {
        self.projects
            .iter()
            .position(|project| project.id == project_id)
            .ok_or_else(|| Error::ProjectNotFound(project_id.to_string()))
    }

    fn persist(&mut self, next: Vec<Project>) -> Result<()> {
        self.storage.write_collection(PROJECTS_KEY, &next)?;
        self.projects = next;
        Ok(())
    }
}
