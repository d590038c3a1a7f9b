//! Human and JSON rendering shared by every taskdeck command.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, JsonError, Result};

pub const SCHEMA_VERSION: &str = "taskdeck.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Plain-text report: a header, then `Summary`, `Details`, `Warnings` and
/// `Next steps` sections, each omitted when empty.
///
/// Warnings and next steps also travel in the JSON envelope.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    fields: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            fields: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    /// A follow-up command worth running after this one.
    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;
        if !self.fields.is_empty() {
            f.write_str("\n\nSummary:")?;
            for (key, value) in &self.fields {
                if value.is_empty() {
                    write!(f, "\n- {key}")?;
                } else {
                    write!(f, "\n- {key}: {value}")?;
                }
            }
        }

        let sections = [
            ("Details", &self.details),
            ("Warnings", &self.warnings),
            ("Next steps", &self.next_steps),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for item in items {
                write!(f, "\n- {item}")?;
            }
        }
        Ok(())
    }
}

/// `data` is set on success and `error` on failure, never both.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

impl<T: Serialize> Envelope<'_, T> {
    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let (warnings, next_steps) = human
            .map(|h| (h.warnings.clone(), h.next_steps.clone()))
            .unwrap_or_default();
        return Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings,
            next_steps,
        }
        .print();
    }

    match human {
        Some(human) if !options.quiet => println!("{human}"),
        _ => {}
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = recovery_hint(err);
    if json {
        return Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(JsonError::from(err)),
            warnings: Vec::new(),
            next_steps: hint.iter().map(|step| step.to_string()).collect(),
        }
        .print();
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

fn recovery_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::TaskNotFound(_) => Some("taskdeck task list"),
        Error::ProjectNotFound(_) => Some("taskdeck project list"),
        Error::ProtectedProject(_) => {
            Some("rename it instead: taskdeck project edit default --name <NAME>")
        }
        Error::InvalidConfig(_) => Some("fix .taskdeck.toml then retry"),
        Error::LockFailed(_) => Some("another writer holds the store; retry"),
        _ => None,
    }
}

/// Best-effort command name ("task add", "summary") for error envelopes,
/// which are emitted before or without a parsed [`Cli`](crate::cli::Cli).
pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

fn command_name_from(args: impl IntoIterator<Item = String>) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--dir" {
            args.next();
        } else if !arg.starts_with('-') {
            let grouped = matches!(arg.as_str(), "task" | "project");
            words.push(arg);
            // only `task` and `project` take a subcommand
            if words.len() == 2 || (words.len() == 1 && !grouped) {
                break;
            }
        }
    }

    if words.is_empty() {
        "taskdeck".to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn command_name_includes_group_subcommand() {
        assert_eq!(command_name_from(args(&["--json", "task", "add", "x"])), "task add");
        assert_eq!(command_name_from(args(&["--dir", "/tmp/s", "project", "list"])), "project list");
        assert_eq!(command_name_from(args(&["summary", "extra"])), "summary");
        assert_eq!(command_name_from(args(&["task"])), "task");
        assert_eq!(command_name_from(args(&[])), "taskdeck");
    }

    #[test]
    fn human_sections_are_omitted_when_empty() {
        let mut human = HumanOutput::new("Tasks");
        human.push_summary("Total", "2");
        human.push_detail("a");
        assert_eq!(human.to_string(), "Tasks\n\nSummary:\n- Total: 2\n\nDetails:\n- a");
    }

    #[test]
    fn next_steps_render_last() {
        let mut human = HumanOutput::new("Project deleted");
        human.push_next_step("taskdeck task list --project default");
        human.push_warning("w");
        assert_eq!(
            human.to_string(),
            "Project deleted\n\nWarnings:\n- w\n\nNext steps:\n- taskdeck task list --project default"
        );
    }
}
