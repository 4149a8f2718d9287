//! Structured error type for `taskqueue`.
//!
//! `QueueError` is the only error type that crosses the queue's public
//! boundary. Internal plumbing (worker handlers, scheduler tasks) is free to
//! use `anyhow::Error` for ergonomics, but nothing typed as `anyhow::Error`
//! is ever returned from a `Queue` method.

use thiserror::Error;

use crate::entry::EntryId;

/// Errors returned by [`crate::Queue`] operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// `complete` or `abandon` was called with an id that is not in the
    /// in-flight table. This indicates a programmer error: a double
    /// complete/abandon, or a call made after the visibility timeout already
    /// reclaimed the entry.
    #[error("entry {id} is not in flight (double complete/abandon, or already reclaimed)")]
    NotInFlight {
        /// The id that was not found.
        id: EntryId,
    },

    /// A configured [`crate::Serializer`] failed while deep-copying a
    /// payload on enqueue or dequeue.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_in_flight_display_includes_id() {
        let id = EntryId::new();
        let err = QueueError::NotInFlight { id };
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn serialization_display_includes_message() {
        let err = QueueError::Serialization("boom".to_string());
        assert!(err.to_string().contains("boom"));
    }
}
