//! Monotonic counters tracked by a queue.
//!
//! Each counter is an independent `AtomicU64`; reads are consistent with
//! themselves but not with one another, matching the spec's "no snapshot
//! across counters" ordering guarantee.

use std::sync::atomic::{AtomicU64, Ordering};

/// The six counters a queue tracks, plus accessors.
#[derive(Default)]
pub(crate) struct Counters {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    completed: AtomicU64,
    abandoned: AtomicU64,
    worker_errors: AtomicU64,
    worker_timeouts: AtomicU64,
}

impl Counters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inc_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_dequeued(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_worker_errors(&self) {
        self.worker_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_worker_timeouts(&self) {
        self.worker_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub(crate) fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    pub(crate) fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub(crate) fn abandoned(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    pub(crate) fn worker_errors(&self) -> u64 {
        self.worker_errors.load(Ordering::Relaxed)
    }

    pub(crate) fn worker_timeouts(&self) -> u64 {
        self.worker_timeouts.load(Ordering::Relaxed)
    }

    /// Zero every counter except `worker_timeouts` (spec §9, Open Question a).
    pub(crate) fn reset_for_delete(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.dequeued.store(0, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
        self.abandoned.store(0, Ordering::Relaxed);
        self.worker_errors.store(0, Ordering::Relaxed);
    }
}
