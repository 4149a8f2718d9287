//! Embedded worker loop (C9).
//!
//! Grounded in the teacher pack's `JobWorker` service: a `CancellationToken`
//! for cooperative shutdown, `tokio::select!` between the cancellation and
//! the poll wait, and auto-complete-on-success semantics around a
//! user-supplied async handler.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::entry::Entry;
use crate::queue::Inner;

/// Maximum time the worker loop blocks on the availability signal per
/// iteration before re-checking for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// User-supplied processing logic for entries pulled by the embedded worker.
///
/// Mirrors the teacher's `Effect` trait: async, does IO, returns a result.
/// Returning `Err` abandons the entry and increments `worker_error_count`;
/// returning `Ok(())` completes it automatically when `auto_complete` is set.
#[async_trait::async_trait]
pub trait Handler<T>: Send + Sync {
    /// Process one delivered entry.
    async fn handle(&self, entry: &Entry<T>) -> anyhow::Result<()>;
}

pub(crate) struct WorkerState {
    token: CancellationToken,
    #[allow(dead_code)]
    join: JoinHandle<()>,
}

impl WorkerState {
    pub(crate) fn spawn<T, H>(inner: Arc<Inner<T>>, handler: H, auto_complete: bool) -> Self
    where
        T: Send + Sync + Clone + 'static,
        H: Handler<T> + 'static,
    {
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let handler = Arc::new(handler);
        let join = tokio::spawn(async move {
            run(inner, handler, auto_complete, loop_token).await;
        });
        Self { token, join }
    }

    pub(crate) fn stop(&self) {
        self.token.cancel();
    }
}

async fn run<T>(
    inner: Arc<Inner<T>>,
    handler: Arc<dyn Handler<T>>,
    auto_complete: bool,
    token: CancellationToken,
) where
    T: Send + Sync + Clone + 'static,
{
    info!(queue_id = %inner.queue_id(), "worker started");

    loop {
        if token.is_cancelled() {
            break;
        }

        if inner.ready_count() == 0 {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = inner.signal_wait(POLL_INTERVAL) => {}
            }
            if token.is_cancelled() {
                break;
            }
        }

        match inner.dequeue(Duration::ZERO).await {
            Ok(None) => continue,
            Ok(Some(entry)) => {
                let id = entry.id();
                match handler.handle(&entry).await {
                    Ok(()) => {
                        if auto_complete {
                            if let Err(e) = inner.complete(id) {
                                warn!(queue_id = %inner.queue_id(), %id, error = %e, "auto-complete failed");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(queue_id = %inner.queue_id(), %id, error = %e, "worker handler failed, abandoning entry");
                        if let Err(e) = inner.abandon(id) {
                            warn!(queue_id = %inner.queue_id(), %id, error = %e, "failed to abandon after handler error");
                        }
                        inner.counters().inc_worker_errors();
                    }
                }
            }
            Err(e) => {
                warn!(queue_id = %inner.queue_id(), error = %e, "dequeue failed in worker loop");
            }
        }
    }

    debug!(queue_id = %inner.queue_id(), "worker stopped");
}
