//! taskdeck watch: a long-lived view that follows the store.

use std::time::Duration;

use super::task::{emit_list, ListOptions};
use super::StoreContext;
use crate::error::Result;
use crate::filter::TaskFilter;
use crate::output::OutputOptions;
use crate::watch::StoreWatcher;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn run(
    ctx: &StoreContext,
    options: ListOptions,
    max_updates: Option<usize>,
    output: OutputOptions,
) -> Result<()> {
    let filter = TaskFilter::parse(&options.status, &options.priority, &options.project)?;
    if max_updates == Some(0) {
        return emit_list(&ctx.open_tracker(), &filter, "watch", output);
    }

    // The watcher must be live before the first read, or an external write
    // landing between that read and the spawn would never be reported.
    let debounce = Duration::from_millis(ctx.config.watch.debounce_ms);
    let _watcher = StoreWatcher::spawn(&ctx.dir, ctx.storage.bus().clone(), debounce)?;
    let mut tracker = ctx.open_tracker();
    emit_list(&tracker, &filter, "watch", output)?;

    let mut updates = 0;
    loop {
        if !tracker.wait_for_change(POLL_INTERVAL) {
            continue;
        }
        emit_list(&tracker, &filter, "watch", output)?;
        updates += 1;
        if matches!(max_updates, Some(max) if updates >= max) {
            return Ok(());
        }
    }
}
