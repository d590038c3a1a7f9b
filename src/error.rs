//! Error types for taskdeck
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (empty title, unknown id, bad arguments)
//! - 3: Blocked by policy (deleting the default project)
//! - 4: Operation failed (I/O, lock contention, watcher failure)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskdeck CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const POLICY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskdeck operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Policy blocks (exit code 3)
    #[error("Project '{0}' is protected and cannot be deleted")]
    ProtectedProject(String),

    // Operation failures (exit code 4)
    #[error("Stored collection '{key}' is unreadable: {message}")]
    StorageCorrupt { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Store watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::TaskNotFound(_)
            | Error::ProjectNotFound(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            Error::ProtectedProject(_) => exit_codes::POLICY_BLOCKED,

            Error::StorageCorrupt { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::Watch(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Stable machine-readable name for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::TaskNotFound(_) | Error::ProjectNotFound(_) => "not_found",
            Error::InvalidConfig(_) => "invalid_config",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::ProtectedProject(_) => "protected",
            Error::StorageCorrupt { .. } => "storage_corrupt",
            _ => "operation_failed",
        }
    }

    /// Structured fields for JSON error output, when the variant has any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(id) => Some(serde_json::json!({ "task_id": id })),
            Error::ProjectNotFound(id) | Error::ProtectedProject(id) => {
                Some(serde_json::json!({ "project_id": id }))
            }
            Error::StorageCorrupt { key, message } => {
                Some(serde_json::json!({ "key": key, "message": message }))
            }
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for taskdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// The `error` object of a JSON error envelope
#[derive(serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
