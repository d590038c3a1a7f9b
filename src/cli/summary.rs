//! taskdeck summary command.

use serde::Serialize;

use super::StoreContext;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::stats::Summary;

#[derive(Serialize)]
struct SummaryOutput {
    #[serde(flatten)]
    summary: Summary,
    orphaned_tasks: usize,
}

pub fn run(ctx: &StoreContext, output: OutputOptions) -> Result<()> {
    let tracker = ctx.open_tracker();
    let data = SummaryOutput {
        summary: tracker.summary(),
        orphaned_tasks: tracker.orphaned_tasks().len(),
    };

    let mut human = HumanOutput::new("Summary");
    human.push_summary("Total tasks", data.summary.total_tasks.to_string());
    human.push_summary("Pending", data.summary.pending_tasks.to_string());
    human.push_summary("Completed", data.summary.completed_tasks.to_string());
    human.push_summary("Projects", data.summary.projects.to_string());
    for (project, count) in tracker.task_counts() {
        human.push_detail(format!("{}: {count}", project.name));
    }
    if data.orphaned_tasks > 0 {
        human.push_warning(format!(
            "{} task(s) reference a deleted project",
            data.orphaned_tasks
        ));
        human.push_next_step("taskdeck task edit <ID> --project <PROJECT>");
    }
    emit_success(output, "summary", &data, Some(&human))
}
