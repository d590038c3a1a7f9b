//! Command-line interface for taskdeck
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::{FileStore, Storage};
use crate::tracker::Tracker;

mod project;
mod summary;
mod task;
mod watch;

/// Fallback store directory when nothing else is configured
const LOCAL_STORE_DIR: &str = ".taskdeck";

/// taskdeck - tasks grouped into projects, shared by every open view
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store directory holding tasks.json and projects.json
    #[arg(long, global = true, env = "TASKDECK_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task and project counts
    Summary,

    /// Print the task list and reprint it whenever the store changes
    Watch {
        /// Status filter: all, pending, completed
        #[arg(long, default_value = "all")]
        status: String,

        /// Priority filter: all, low, medium, high
        #[arg(long, default_value = "all")]
        priority: String,

        /// Project filter: all or a project id
        #[arg(long, default_value = "all")]
        project: String,

        /// Exit after this many reprints (0 prints once and exits)
        #[arg(long)]
        max_updates: Option<usize>,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Owning project id (defaults to the General project)
        #[arg(long)]
        project: Option<String>,
    },

    /// List tasks
    List {
        /// Status filter: all, pending, completed
        #[arg(long, default_value = "all")]
        status: String,

        /// Priority filter: all, low, medium, high
        #[arg(long, default_value = "all")]
        priority: String,

        /// Project filter: all or a project id
        #[arg(long, default_value = "all")]
        project: String,
    },

    /// Edit a task; omitted fields are left unchanged
    Edit {
        /// Task ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// Move to another project
        #[arg(long)]
        project: Option<String>,
    },

    /// Flip a task between pending and completed
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Add {
        /// Project name
        name: String,

        /// Colour: maroon, green, orange, blue, purple, teal
        #[arg(long)]
        color: Option<String>,
    },

    /// List projects with task counts
    List,

    /// Rename or recolour a project
    Edit {
        /// Project ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New colour
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a project; its tasks move to the General project
    Delete {
        /// Project ID
        id: String,
    },
}

/// Store location and settings shared by every command
pub(crate) struct StoreContext {
    pub dir: PathBuf,
    pub config: Config,
    pub storage: Storage,
}

impl StoreContext {
    fn resolve(dir: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let config = Config::load_from_dir(&cwd);
        let dir = resolve_store_dir(dir, &config, &cwd);
        tracing::debug!(dir = %dir.display(), "using store directory");
        let storage = Storage::new(
            FileStore::new(&dir).with_lock_timeout(config.store.lock_timeout_ms),
        );
        Ok(Self {
            dir,
            config,
            storage,
        })
    }

    pub fn open_tracker(&self) -> Tracker {
        Tracker::open(self.storage.clone())
    }
}

/// `--dir`/`TASKDECK_DIR`, then `store.dir`, then the platform data dir,
/// then `./.taskdeck`.
fn resolve_store_dir(flag: Option<PathBuf>, config: &Config, cwd: &std::path::Path) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(dir) = config.store.dir.as_ref() {
        return if dir.is_absolute() {
            dir.clone()
        } else {
            cwd.join(dir)
        };
    }
    ProjectDirs::from("", "", "taskdeck")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| cwd.join(LOCAL_STORE_DIR))
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = StoreContext::resolve(self.dir)?;
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    description,
                    priority,
                    due,
                    project,
                } => task::run_add(
                    &ctx,
                    task::AddOptions {
                        title,
                        description,
                        priority,
                        due,
                        project,
                    },
                    output,
                ),
                TaskCommands::List {
                    status,
                    priority,
                    project,
                } => task::run_list(
                    &ctx,
                    task::ListOptions {
                        status,
                        priority,
                        project,
                    },
                    output,
                ),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    priority,
                    due,
                    clear_due,
                    project,
                } => task::run_edit(
                    &ctx,
                    task::EditOptions {
                        id,
                        title,
                        description,
                        priority,
                        due,
                        clear_due,
                        project,
                    },
                    output,
                ),
                TaskCommands::Toggle { id } => task::run_toggle(&ctx, &id, output),
                TaskCommands::Delete { id } => task::run_delete(&ctx, &id, output),
            },
            Commands::Project(cmd) => match cmd {
                ProjectCommands::Add { name, color } => {
                    project::run_add(&ctx, &name, color.as_deref(), output)
                }
                ProjectCommands::List => project::run_list(&ctx, output),
                ProjectCommands::Edit { id, name, color } => project::run_edit(
                    &ctx,
                    project::EditOptions { id, name, color },
                    output,
                ),
                ProjectCommands::Delete { id } => project::run_delete(&ctx, &id, output),
            },
            Commands::Summary => summary::run(&ctx, output),
            Commands::Watch {
                status,
                priority,
                project,
                max_updates,
            } => watch::run(
                &ctx,
                task::ListOptions {
                    status,
                    priority,
                    project,
                },
                max_updates,
                output,
            ),
        }
    }
}
