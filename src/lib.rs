//! taskdeck - Personal Task Tracker Library
//!
//! Core of a task tracker whose state lives in a shared key-value store and
//! is kept consistent across several concurrently open views.
//!
//! # Core Concepts
//!
//! - **Tasks**: titled work items with status, priority, optional due date
//! - **Projects**: coloured groupings; the built-in "General" project always exists
//! - **Store**: whole-collection JSON documents under the keys `tasks` and `projects`
//! - **Change bus**: payload-free notifications after every write; views re-read
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.taskdeck.toml`
//! - `error`: Error types and result aliases
//! - `events`: Change notification bus
//! - `filter`: Status/priority/project task filtering
//! - `id`: Record id generation and timestamp refresh
//! - `lock`: File locking and atomic writes for the file store
//! - `output`: Human and JSON rendering for CLI commands
//! - `project`: Project records and repository
//! - `stats`: Summary counts
//! - `storage`: Key-value backends and collection persistence
//! - `task`: Task records and repository
//! - `tracker`: Session facade tying repositories to the change bus
//! - `watch`: Filesystem watcher bridging other processes' writes onto the bus

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod id;
pub mod lock;
pub mod output;
pub mod project;
pub mod stats;
pub mod storage;
pub mod task;
pub mod tracker;
pub mod watch;

pub use error::{Error, Result};
pub use tracker::Tracker;
