//! Cross-process change delivery for a [`FileStore`](crate::storage::FileStore).
//!
//! In-process writers publish on the [`ChangeBus`] themselves. Writers in
//! other processes only touch the store directory, so a filesystem watcher
//! turns those file events into bus notifications. Bursts of events (temp
//! file, rename, lock file) are debounced into a single notification.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::Result;
use crate::events::ChangeBus;
use crate::storage::COLLECTION_EXT;

const IDLE_WAIT: Duration = Duration::from_secs(3600);

/// A burst never delays its notification by more than this many debounce
/// periods, however steadily events keep arriving.
const MAX_DEBOUNCE_PERIODS: u32 = 5;

/// Pending notification for a run of file events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Burst {
    started: Instant,
    deadline: Instant,
}

impl Burst {
    fn start(now: Instant, debounce: Duration) -> Self {
        Self {
            started: now,
            deadline: now + debounce,
        }
    }

    fn extend(self, now: Instant, debounce: Duration) -> Self {
        let latest = self.started + debounce * MAX_DEBOUNCE_PERIODS;
        Self {
            started: self.started,
            deadline: (now + debounce).min(latest),
        }
    }
}

/// Running watcher; stops when dropped.
pub struct StoreWatcher {
    watcher: Option<RecommendedWatcher>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWatcher {
    /// Watch `dir` and publish on `bus` after `debounce` of quiet.
    pub fn spawn(dir: &Path, bus: ChangeBus, debounce: Duration) -> Result<Self> {
        std::fs::create_dir_all(dir)?;

        let (event_tx, event_rx) = mpsc::channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        let watched = dir.to_path_buf();
        let handle = thread::spawn(move || {
            let mut pending: Option<Burst> = None;
            loop {
                let timeout = pending
                    .map(|burst| burst.deadline.saturating_duration_since(Instant::now()))
                    .unwrap_or(IDLE_WAIT);
                match event_rx.recv_timeout(timeout) {
                    Ok(Ok(event)) => {
                        if touches_collection(&event) {
                            let now = Instant::now();
                            pending = Some(match pending {
                                Some(burst) => burst.extend(now, debounce),
                                None => Burst::start(now, debounce),
                            });
                        }
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(dir = %watched.display(), error = %err, "store watch error");
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if pending.take().is_some() {
                            let reached = bus.publish();
                            tracing::debug!(reached, "external store change published");
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        tracing::debug!(dir = %dir.display(), "watching store directory");
        Ok(Self {
            watcher: Some(watcher),
            handle: Some(handle),
        })
    }
}

impl Drop for StoreWatcher {
    fn drop(&mut self) {
        // Dropping the watcher drops the event sender, which ends the thread.
        self.watcher.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn touches_collection(event: &Event) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event.paths.iter().any(|path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == COLLECTION_EXT)
            .unwrap_or(false)
    })
}
