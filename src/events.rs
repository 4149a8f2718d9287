//! Event-handler hooks injected into a queue.
//!
//! Mirrors the teacher crate's `Machine` trait: pure, synchronous, no IO.
//! A queue calls these hooks inline on the calling thread for every
//! state-changing operation, so implementations must be cheap and must not
//! block.

use crate::entry::EntryId;

/// Observation and veto hooks for queue lifecycle events.
///
/// All methods have no-op default implementations, so callers only override
/// the hooks they care about. `before_enqueue` is the only hook that can
/// change queue behavior; the rest are pure observation.
pub trait QueueEvents<T>: Send + Sync {
    /// Called before an entry is appended to the ready list.
    ///
    /// Returning `false` vetoes the enqueue: no id is allocated, no counters
    /// change, and [`crate::Queue::enqueue`] returns `None`.
    fn before_enqueue(&self, queue_id: &str, payload: &T) -> bool {
        let _ = (queue_id, payload);
        true
    }

    /// Called after an entry has been appended to the ready list.
    fn after_enqueue(&self, queue_id: &str, id: EntryId, payload: &T) {
        let _ = (queue_id, id, payload);
    }

    /// Called when an entry is delivered to a consumer.
    fn on_dequeue(&self, queue_id: &str, id: EntryId, payload: &T) {
        let _ = (queue_id, id, payload);
    }

    /// Called when an entry is completed.
    fn on_complete(&self, queue_id: &str, id: EntryId) {
        let _ = (queue_id, id);
    }

    /// Called when an entry is abandoned (explicitly or via visibility
    /// timeout).
    fn on_abandon(&self, queue_id: &str, id: EntryId) {
        let _ = (queue_id, id);
    }
}

/// The default handler: observes nothing, vetoes nothing.
pub struct NoOpEvents;

impl<T> QueueEvents<T> for NoOpEvents {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vetoer;
    impl<T> QueueEvents<T> for Vetoer {
        fn before_enqueue(&self, _queue_id: &str, _payload: &T) -> bool {
            false
        }
    }

    #[test]
    fn noop_allows_enqueue() {
        let handler = NoOpEvents;
        assert!(QueueEvents::<&str>::before_enqueue(&handler, "q", &"x"));
    }

    #[test]
    fn custom_handler_can_veto() {
        let handler = Vetoer;
        assert!(!QueueEvents::<&str>::before_enqueue(&handler, "q", &"x"));
    }
}
