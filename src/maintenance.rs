//! Maintenance timer: at most one pending visibility-timeout sweep.
//!
//! Holds the scheduling state only. The sweep itself — scanning the
//! in-flight table and abandoning timed-out entries — lives in
//! [`crate::queue::Queue`], since it needs access to the in-flight table,
//! the counters, and `abandon`.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

#[derive(Default)]
pub(crate) struct MaintenanceTimer {
    next_at: Option<Instant>,
    handle: Option<JoinHandle<()>>,
}

impl MaintenanceTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire at `deadline`, via `spawn`, unless a timer is
    /// already pending with an earlier deadline. `spawn` receives the delay
    /// until `deadline` and returns the task handle.
    ///
    /// Returns `true` if a new task was spawned (the caller should then
    /// store the handle by way of `spawn`'s side effect; this method just
    /// decides whether to call it).
    pub(crate) fn arm(&mut self, deadline: Instant, spawn: impl FnOnce(Duration) -> JoinHandle<()>) {
        if let Some(pending) = self.next_at {
            if pending <= deadline {
                return;
            }
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        let delay = deadline.saturating_duration_since(Instant::now());
        self.next_at = Some(deadline);
        self.handle = Some(spawn(delay));
    }

    /// Called from inside the sweep task before it re-arms. Clears the
    /// handle bookkeeping (the handle is this very task, already running,
    /// so there is nothing to abort) so a following `arm` call schedules a
    /// fresh task instead of aborting itself.
    pub(crate) fn mark_fired(&mut self) {
        self.next_at = None;
        self.handle = None;
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.next_at = None;
    }
}
