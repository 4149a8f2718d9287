//! Availability signal: an auto-reset wakeup for consumers blocked on an
//! empty ready list.
//!
//! Backed by [`tokio::sync::Notify`], which already satisfies the contract:
//! `notify_one` wakes at most one waiter, and every wait in this crate is
//! followed by a re-check of the ready list length, so spurious wakeups are
//! harmless.

use std::time::Duration;

use tokio::sync::Notify;

#[derive(Default)]
pub(crate) struct AvailabilitySignal {
    notify: Notify,
}

impl AvailabilitySignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wake at most one waiter.
    pub(crate) fn set(&self) {
        self.notify.notify_one();
    }

    /// Wait up to `timeout` for a `set()`. Returns `true` if woken before the
    /// timeout elapsed, `false` otherwise. A `Duration::ZERO` timeout returns
    /// `false` immediately without yielding.
    pub(crate) async fn wait(&self, timeout: Duration) -> bool {
        if timeout.is_zero() {
            return false;
        }
        tokio::time::timeout(timeout, self.notify.notified())
            .await
            .is_ok()
    }
}
