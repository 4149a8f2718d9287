//! Entry envelope and id type.
//!
//! An [`Entry`] wraps a caller-supplied payload with the bookkeeping the
//! queue needs: a stable id, an attempt counter, and the wall-clock time of
//! the most recent dequeue.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Opaque, unique identifier for a queue entry.
///
/// Stable across retries: the same id is used for every delivery of the
/// same logical work item until it is completed or dead-lettered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh, random id.
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A caller payload wrapped with delivery bookkeeping.
///
/// `attempts` is `0` until the first dequeue and `dequeued_at` is `None`
/// until then; both are updated in place on every redelivery.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    id: EntryId,
    payload: T,
    attempts: u32,
    enqueued_at: DateTime<Utc>,
    dequeued_at: Option<DateTime<Utc>>,
}

impl<T> Entry<T> {
    pub(crate) fn new(payload: T) -> Self {
        Self {
            id: EntryId::new(),
            payload,
            attempts: 0,
            enqueued_at: Utc::now(),
            dequeued_at: None,
        }
    }

    /// This entry's stable id.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The caller's payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consume the entry, returning the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Number of times this entry has been dequeued, including the current
    /// delivery. `0` before the first dequeue.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When this entry was first enqueued.
    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }

    /// When this entry was most recently dequeued, if ever.
    pub fn dequeued_at(&self) -> Option<DateTime<Utc>> {
        self.dequeued_at
    }

    pub(crate) fn mark_dequeued(&mut self, at: DateTime<Utc>) {
        self.attempts += 1;
        self.dequeued_at = Some(at);
    }

    /// Rebuild this entry around a different payload value, keeping its id,
    /// attempt count, and timestamps. Used when a configured serializer
    /// produces a deep copy for delivery.
    pub(crate) fn with_payload(self, payload: T) -> Entry<T> {
        Entry { payload, ..self }
    }
}
