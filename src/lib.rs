//! An in-process, typed work queue with at-least-once delivery, visibility
//! timeouts, retry backoff, dead-lettering, and an embedded worker
//! dispatcher.
//!
//! A [`Queue`] lives entirely inside one process: no network hop, no
//! external broker. It exists for the shape of problem a broker is overkill
//! for — background work fanned out across a handful of Tokio tasks inside
//! a single binary — while still giving you the guarantees a broker-backed
//! queue would: an entry delivered but never completed comes back for
//! redelivery, repeated failures eventually dead-letter, and the worker
//! loop can be embedded or driven by hand.
//!
//! ```
//! use taskqueue::{Queue, QueueConfigBuilder};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), taskqueue::QueueError> {
//! let queue: Queue<String> = Queue::new(QueueConfigBuilder::new().build());
//! queue.enqueue("hello".to_string())?;
//!
//! let entry = queue.dequeue(Some(Duration::from_secs(1))).await?.unwrap();
//! println!("{}", entry.payload());
//! queue.complete(entry.id())?;
//! # Ok(())
//! # }
//! ```

mod config;
mod entry;
mod error;
mod events;
mod maintenance;
mod metrics;
mod queue;
mod retry;
mod serializer;
mod signal;
mod stats;
mod worker;

pub use config::{QueueConfig, QueueConfigBuilder};
pub use entry::{Entry, EntryId};
pub use error::QueueError;
pub use events::{NoOpEvents, QueueEvents};
pub use metrics::{Metrics, NoOpMetrics};
pub use queue::Queue;
pub use serializer::Serializer;
pub use worker::Handler;

#[cfg(feature = "json-serializer")]
pub use serializer::JsonSerializer;
