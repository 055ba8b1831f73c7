//! Periodic expiry sweeper.
//!
//! One tokio task per store wakes on a fixed period and evicts whatever the
//! store considers dead (expired, or for files also downloaded). The task
//! touches the store only through its public operations, so it follows the
//! same concurrency rules as request handlers.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::storage::{FileStore, MessageStore};

/// Something that can evict its own dead entries.
pub trait Sweep: Send + Sync + 'static {
    /// Short label for log lines.
    fn label(&self) -> &'static str;

    /// Evict dead entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

impl Sweep for FileStore {
    fn label(&self) -> &'static str {
        "files"
    }

    fn sweep(&self) -> usize {
        FileStore::sweep(self)
    }
}

impl Sweep for MessageStore {
    fn label(&self) -> &'static str {
        "messages"
    }

    fn sweep(&self) -> usize {
        MessageStore::sweep(self)
    }
}

/// Handle to a running sweeper task.
///
/// Dropping the handle leaves the task running for the life of the runtime.
#[derive(Debug)]
pub struct SweeperHandle {
    label: &'static str,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Store label this sweeper serves.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stop the sweeper.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Shortest period a sweeper will run at; smaller values are raised to it.
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// Spawn a sweeper for `store` on the current tokio runtime.
///
/// The first pass runs one full `period` after spawning. A pass that overruns
/// pushes the next one back instead of bunching them up. A zero `period` is
/// raised to [`MIN_SWEEP_PERIOD`].
pub fn spawn<S: Sweep>(store: S, period: Duration) -> SweeperHandle {
    let period = period.max(MIN_SWEEP_PERIOD);
    let label = store.label();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let evicted = store.sweep();
            if evicted > 0 {
                tracing::debug!(store = label, count = evicted, "Swept dead entries");
            }
        }
    });

    tracing::debug!(store = label, period_secs = period.as_secs(), "Sweeper started");
    SweeperHandle { label, task }
}
