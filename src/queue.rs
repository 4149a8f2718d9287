//! Queue facade (C8): the public entry point tying every other module
//! together.
//!
//! [`Inner`] holds all shared state behind an `Arc`; [`Queue`] is a thin
//! cloneable handle around it, mirroring the teacher's `EngineHandle`
//! pattern — cheap to clone, safe to hand to a spawned worker task.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::entry::{Entry, EntryId};
use crate::error::QueueError;
use crate::events::QueueEvents;
use crate::maintenance::MaintenanceTimer;
use crate::retry::backoff_delay;
use crate::signal::AvailabilitySignal;
use crate::stats::Counters;
use crate::worker::{Handler, WorkerState};

struct InFlight<T> {
    entry: Entry<T>,
    deadline: Instant,
}

/// Shared state behind every [`Queue`] handle.
pub(crate) struct Inner<T> {
    queue_id: String,
    config: QueueConfig<T>,
    events: Mutex<Arc<dyn QueueEvents<T>>>,
    ready: Mutex<VecDeque<Entry<T>>>,
    inflight: DashMap<EntryId, InFlight<T>>,
    dead_letter: Mutex<Vec<Entry<T>>>,
    signal: AvailabilitySignal,
    counters: Counters,
    maintenance: Mutex<MaintenanceTimer>,
    worker: Mutex<Option<WorkerState>>,
}

impl<T> Inner<T>
where
    T: Send + Sync + Clone + 'static,
{
    pub(crate) fn queue_id(&self) -> &str {
        &self.queue_id
    }

    pub(crate) fn counters(&self) -> &Counters {
        &self.counters
    }

    fn report_gauge(&self, suffix: &str, value: f64) {
        if let (Some(metrics), Some(name)) = (&self.config.metrics, &self.config.gauge_name) {
            metrics.gauge(&format!("{name}.{suffix}"), value);
        }
    }

    fn events(&self) -> Arc<dyn QueueEvents<T>> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn set_event_handler(&self, handler: Arc<dyn QueueEvents<T>>) {
        *self.events.lock().unwrap() = handler;
    }

    /// C8 enqueue: append a new entry to the ready list unless a
    /// `before_enqueue` hook vetoes it.
    pub(crate) fn enqueue(self: &Arc<Self>, payload: T) -> Result<Option<EntryId>, QueueError> {
        if !self.events().before_enqueue(&self.queue_id, &payload) {
            return Ok(None);
        }

        let payload = match &self.config.serializer {
            Some(serializer) => serializer.deep_copy(&payload)?,
            None => payload,
        };

        let entry = Entry::new(payload);
        let id = entry.id();

        {
            let mut ready = self.ready.lock().unwrap();
            ready.push_back(entry.clone());
        }
        self.counters.inc_enqueued();
        self.signal.set();
        self.report_gauge("ready_count", self.ready.lock().unwrap().len() as f64);

        self.events().after_enqueue(&self.queue_id, id, entry.payload());
        debug!(queue_id = %self.queue_id, %id, "enqueued");
        Ok(Some(id))
    }

    /// C8 dequeue: pop the oldest ready entry, move it into the in-flight
    /// table with a fresh visibility deadline, and arm maintenance.
    ///
    /// `timeout == Duration::ZERO` polls once without blocking. The wait is
    /// bounded by a deadline computed once up front, so repeated wakeups
    /// that lose the race for the popped entry never extend the total wait
    /// beyond the caller's requested `timeout`.
    pub(crate) async fn dequeue(
        self: &Arc<Self>,
        timeout: Duration,
    ) -> Result<Option<Entry<T>>, QueueError> {
        let deadline = Instant::now() + timeout;
        loop {
            let popped = self.ready.lock().unwrap().pop_front();
            if let Some(mut entry) = popped {
                entry.mark_dequeued(chrono::Utc::now());
                let id = entry.id();
                let visibility_deadline = Instant::now() + self.config.visibility_timeout;

                // Insert into the in-flight table before doing anything that
                // can fail, so a serializer error downstream never loses the
                // entry — it stays tracked in-flight and the caller sees a
                // typed error instead of silent data loss.
                self.inflight.insert(id, InFlight { entry: entry.clone(), deadline: visibility_deadline });
                self.counters.inc_dequeued();
                self.arm_maintenance(visibility_deadline);
                self.report_gauge("in_flight_count", self.inflight.len() as f64);

                let delivered = match &self.config.serializer {
                    Some(serializer) => entry.clone().with_payload(serializer.deep_copy(entry.payload())?),
                    None => entry.clone(),
                };

                self.events().on_dequeue(&self.queue_id, id, delivered.payload());
                debug!(queue_id = %self.queue_id, %id, attempts = delivered.attempts(), "dequeued");
                return Ok(Some(delivered));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if !self.signal.wait(remaining).await {
                return Ok(None);
            }
            // Woken, but another consumer may have already taken the entry;
            // loop back and re-check the ready list, waiting only for
            // whatever remains of the original deadline.
        }
    }

    /// C8 complete: remove an in-flight entry permanently.
    pub(crate) fn complete(&self, id: EntryId) -> Result<(), QueueError> {
        self.inflight
            .remove(&id)
            .ok_or(QueueError::NotInFlight { id })?;
        self.counters.inc_completed();
        self.report_gauge("in_flight_count", self.inflight.len() as f64);
        self.events().on_complete(&self.queue_id, id);
        debug!(queue_id = %self.queue_id, %id, "completed");
        Ok(())
    }

    /// C8 abandon: release an in-flight entry, either re-enqueueing it after
    /// a backoff delay or dead-lettering it once `retry_limit` is exceeded.
    pub(crate) fn abandon(self: &Arc<Self>, id: EntryId) -> Result<(), QueueError> {
        let (_, in_flight) = self.inflight.remove(&id).ok_or(QueueError::NotInFlight { id })?;
        self.counters.inc_abandoned();
        self.report_gauge("in_flight_count", self.inflight.len() as f64);
        self.events().on_abandon(&self.queue_id, id);

        let entry = in_flight.entry;
        if entry.attempts() > self.config.retry_limit {
            warn!(queue_id = %self.queue_id, %id, attempts = entry.attempts(), "retry limit exceeded, dead-lettering");
            self.dead_letter.lock().unwrap().push(entry);
            return Ok(());
        }

        let delay = backoff_delay(self.config.retry_delay, &self.config.retry_multipliers, entry.attempts());
        if delay.is_zero() {
            self.ready.lock().unwrap().push_back(entry);
            self.signal.set();
            self.report_gauge("ready_count", self.ready.lock().unwrap().len() as f64);
            return Ok(());
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.ready.lock().unwrap().push_back(entry);
            this.signal.set();
            this.report_gauge("ready_count", this.ready.lock().unwrap().len() as f64);
        });
        Ok(())
    }

    /// C8 delete: drop every ready, in-flight, and dead-lettered entry and
    /// reset counters other than `worker_timeouts` (spec §9, Open Question a).
    pub(crate) fn delete(&self) {
        self.ready.lock().unwrap().clear();
        self.inflight.clear();
        self.dead_letter.lock().unwrap().clear();
        self.counters.reset_for_delete();
        info!(queue_id = %self.queue_id, "queue cleared");
    }

    /// C8 dispose: stop the embedded worker and cancel pending maintenance.
    /// Does not cancel delayed retry tasks already spawned by `abandon` —
    /// those entries rejoin the ready list of an already-disposed queue
    /// (spec §4.3, §9).
    pub(crate) fn dispose(&self) {
        if let Some(worker) = self.worker.lock().unwrap().take() {
            worker.stop();
        }
        self.maintenance.lock().unwrap().cancel();
        info!(queue_id = %self.queue_id, "queue disposed");
    }

    pub(crate) fn dead_letter_items(&self) -> Vec<T> {
        self.dead_letter
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.payload().clone())
            .collect()
    }

    pub(crate) fn dead_letter_entries(&self) -> Vec<Entry<T>> {
        self.dead_letter.lock().unwrap().clone()
    }

    pub(crate) fn ready_count(&self) -> usize {
        self.ready.lock().unwrap().len()
    }

    pub(crate) fn in_flight_count(&self) -> usize {
        self.inflight.len()
    }

    pub(crate) fn dead_letter_count(&self) -> usize {
        self.dead_letter.lock().unwrap().len()
    }

    pub(crate) fn signal_wait(&self, timeout: Duration) -> impl std::future::Future<Output = bool> + '_ {
        self.signal.wait(timeout)
    }

    /// C7 maintenance scheduler: arm a single sweep at `deadline` unless an
    /// earlier one is already pending.
    fn arm_maintenance(self: &Arc<Self>, deadline: Instant) {
        let this = Arc::clone(self);
        self.maintenance.lock().unwrap().arm(deadline, move |delay| {
            let this = Arc::clone(&this);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                this.do_maintenance();
            })
        });
    }

    /// C7 sweep body: abandon every in-flight entry whose visibility
    /// deadline has passed, then re-arm for the next soonest deadline.
    fn do_maintenance(self: &Arc<Self>) {
        self.maintenance.lock().unwrap().mark_fired();

        let now = Instant::now();
        let mut timed_out = Vec::new();
        let mut next_deadline: Option<Instant> = None;
        for entry in self.inflight.iter() {
            if entry.deadline <= now {
                timed_out.push(*entry.key());
            } else {
                next_deadline = Some(match next_deadline {
                    Some(current) if current <= entry.deadline => current,
                    _ => entry.deadline,
                });
            }
        }

        for id in timed_out {
            self.counters.inc_worker_timeouts();
            debug!(queue_id = %self.queue_id, %id, "visibility timeout expired, abandoning");
            let _ = self.abandon(id);
        }

        if let Some(deadline) = next_deadline {
            self.arm_maintenance(deadline);
        }
    }

    /// C9: spawn the embedded worker loop. Replaces any previously running
    /// worker.
    pub(crate) fn start_working<H>(self: &Arc<Self>, handler: H, auto_complete: bool)
    where
        H: Handler<T> + 'static,
    {
        let mut slot = self.worker.lock().unwrap();
        if let Some(existing) = slot.take() {
            existing.stop();
        }
        *slot = Some(WorkerState::spawn(Arc::clone(self), handler, auto_complete));
    }

    pub(crate) fn stop_working(&self) {
        if let Some(worker) = self.worker.lock().unwrap().take() {
            worker.stop();
        }
    }
}

/// A typed, in-process work queue with at-least-once delivery.
///
/// Cheap to clone: every clone shares the same underlying ready list,
/// in-flight table, and counters.
pub struct Queue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Queue<T>
where
    T: Send + Sync + Clone + 'static,
{
    /// Construct a queue with a generated id and the given configuration.
    pub fn new(config: QueueConfig<T>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), config)
    }

    /// Construct a queue with an explicit, caller-chosen id (useful for
    /// correlating logs and metrics across multiple queues in one process).
    pub fn with_id(queue_id: impl Into<String>, config: QueueConfig<T>) -> Self {
        let queue_id = queue_id.into();
        info!(queue_id = %queue_id, "queue constructed");
        let events = Mutex::new(config.events.clone());
        Self {
            inner: Arc::new(Inner {
                queue_id,
                config,
                events,
                ready: Mutex::new(VecDeque::new()),
                inflight: DashMap::new(),
                dead_letter: Mutex::new(Vec::new()),
                signal: AvailabilitySignal::new(),
                counters: Counters::new(),
                maintenance: Mutex::new(MaintenanceTimer::new()),
                worker: Mutex::new(None),
            }),
        }
    }

    /// This queue's id.
    pub fn queue_id(&self) -> &str {
        self.inner.queue_id()
    }

    /// Append `payload` to the ready list. Returns `None` if a
    /// [`crate::QueueEvents::before_enqueue`] hook vetoed the enqueue.
    pub fn enqueue(&self, payload: T) -> Result<Option<EntryId>, QueueError> {
        self.inner.enqueue(payload)
    }

    /// Pull the oldest ready entry, blocking up to `timeout` (or the
    /// configured default when `None`) for one to become available.
    pub async fn dequeue(&self, timeout: Option<Duration>) -> Result<Option<Entry<T>>, QueueError> {
        let timeout = timeout.unwrap_or(self.inner.config.default_dequeue_timeout);
        self.inner.dequeue(timeout).await
    }

    /// Mark an in-flight entry as successfully processed.
    pub fn complete(&self, id: EntryId) -> Result<(), QueueError> {
        self.inner.complete(id)
    }

    /// Release an in-flight entry back for retry, or dead-letter it if its
    /// retry limit has been exceeded.
    pub fn abandon(&self, id: EntryId) -> Result<(), QueueError> {
        self.inner.abandon(id)
    }

    /// Drop every ready, in-flight, and dead-lettered entry.
    pub fn delete(&self) {
        self.inner.delete()
    }

    /// Stop the embedded worker (if any) and cancel pending maintenance.
    pub fn dispose(&self) {
        self.inner.dispose()
    }

    /// Payloads currently held in the dead-letter list.
    pub fn dead_letter_items(&self) -> Vec<T> {
        self.inner.dead_letter_items()
    }

    /// Full entries (with attempts and timestamps) currently held in the
    /// dead-letter list.
    pub fn dead_letter_entries(&self) -> Vec<Entry<T>> {
        self.inner.dead_letter_entries()
    }

    /// Number of entries currently in the ready list.
    pub fn ready_count(&self) -> usize {
        self.inner.ready_count()
    }

    /// Number of entries currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight_count()
    }

    /// Number of entries currently dead-lettered.
    pub fn dead_letter_count(&self) -> usize {
        self.inner.dead_letter_count()
    }

    /// Total entries enqueued over the queue's lifetime (since construction
    /// or the last [`Self::delete`]).
    pub fn enqueued_count(&self) -> u64 {
        self.inner.counters().enqueued()
    }

    /// Total entries dequeued over the queue's lifetime.
    pub fn dequeued_count(&self) -> u64 {
        self.inner.counters().dequeued()
    }

    /// Total entries completed over the queue's lifetime.
    pub fn completed_count(&self) -> u64 {
        self.inner.counters().completed()
    }

    /// Total entries abandoned over the queue's lifetime.
    pub fn abandoned_count(&self) -> u64 {
        self.inner.counters().abandoned()
    }

    /// Total handler failures observed by the embedded worker.
    pub fn worker_error_count(&self) -> u64 {
        self.inner.counters().worker_errors()
    }

    /// Total visibility-timeout reclamations performed by maintenance.
    pub fn worker_timeout_count(&self) -> u64 {
        self.inner.counters().worker_timeouts()
    }

    /// Spawn the embedded worker loop, dispatching dequeued entries to
    /// `handler`. Replaces any previously running worker on this queue.
    ///
    /// When `auto_complete` is `true`, a successful `handle` call completes
    /// the entry automatically; otherwise the handler is responsible for
    /// calling [`Self::complete`] itself.
    pub fn start_working<H>(&self, handler: H, auto_complete: bool)
    where
        H: Handler<T> + 'static,
    {
        self.inner.start_working(handler, auto_complete)
    }

    /// Stop the embedded worker loop, if one is running.
    pub fn stop_working(&self) {
        self.inner.stop_working()
    }

    /// Replace the currently installed event handler.
    pub fn set_event_handler<E>(&self, handler: E)
    where
        E: QueueEvents<T> + 'static,
    {
        self.inner.set_event_handler(Arc::new(handler));
    }

    /// Revert to the no-op event handler, discarding whatever was installed.
    pub fn clear_event_handler(&self) {
        self.inner.set_event_handler(Arc::new(crate::events::NoOpEvents));
    }

    /// The currently installed event handler.
    pub fn event_handler(&self) -> Arc<dyn QueueEvents<T>> {
        self.inner.events()
    }
}
