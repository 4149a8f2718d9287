//! Queue configuration and its builder.

use std::sync::Arc;
use std::time::Duration;

use crate::events::{NoOpEvents, QueueEvents};
use crate::metrics::{Metrics, NoOpMetrics};
use crate::serializer::Serializer;

/// Default retry limit: an entry may be delivered up to `R + 1` times.
pub const DEFAULT_RETRY_LIMIT: u32 = 2;
/// Default base retry delay.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);
/// Default retry multiplier schedule, indexed 1-based by attempt number.
pub const DEFAULT_RETRY_MULTIPLIERS: &[u32] = &[1, 3, 5, 10];
/// Default visibility timeout.
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Default blocking timeout for `dequeue` when none is supplied.
pub const DEFAULT_DEQUEUE_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable configuration for a [`crate::Queue`], assembled via
/// [`QueueConfigBuilder`].
pub struct QueueConfig<T> {
    pub(crate) retry_limit: u32,
    pub(crate) retry_delay: Duration,
    pub(crate) retry_multipliers: Vec<u32>,
    pub(crate) visibility_timeout: Duration,
    pub(crate) default_dequeue_timeout: Duration,
    pub(crate) events: Arc<dyn QueueEvents<T>>,
    pub(crate) metrics: Option<Arc<dyn Metrics>>,
    pub(crate) gauge_name: Option<String>,
    pub(crate) serializer: Option<Arc<dyn Serializer<T>>>,
}

impl<T: Send + Sync + 'static> Default for QueueConfig<T> {
    fn default() -> Self {
        QueueConfigBuilder::new().build()
    }
}

/// Fluent builder for [`QueueConfig`].
///
/// ```
/// use taskqueue::QueueConfigBuilder;
/// use std::time::Duration;
///
/// let config = QueueConfigBuilder::<String>::new()
///     .retry_limit(3)
///     .retry_delay(Duration::from_millis(50))
///     .visibility_timeout(Duration::from_secs(30))
///     .build();
/// ```
pub struct QueueConfigBuilder<T> {
    retry_limit: u32,
    retry_delay: Duration,
    retry_multipliers: Vec<u32>,
    visibility_timeout: Duration,
    default_dequeue_timeout: Duration,
    events: Arc<dyn QueueEvents<T>>,
    metrics: Option<Arc<dyn Metrics>>,
    gauge_name: Option<String>,
    serializer: Option<Arc<dyn Serializer<T>>>,
}

impl<T: Send + Sync + 'static> QueueConfigBuilder<T> {
    /// Start a builder populated with the spec's defaults.
    pub fn new() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_multipliers: DEFAULT_RETRY_MULTIPLIERS.to_vec(),
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
            default_dequeue_timeout: DEFAULT_DEQUEUE_TIMEOUT,
            events: Arc::new(NoOpEvents),
            metrics: None,
            gauge_name: None,
            serializer: None,
        }
    }

    /// Maximum number of abandons before an entry is dead-lettered.
    /// `0` disables retries entirely.
    pub fn retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Base delay multiplied by the retry schedule on each abandon.
    /// `Duration::ZERO` causes immediate re-enqueue.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The 1-indexed multiplier schedule applied to `retry_delay`. Must be
    /// non-empty; attempts beyond the schedule's length reuse the last
    /// multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multipliers` is empty.
    pub fn retry_multipliers(mut self, multipliers: Vec<u32>) -> Self {
        assert!(
            !multipliers.is_empty(),
            "retry multiplier schedule must have at least one entry"
        );
        self.retry_multipliers = multipliers;
        self
    }

    /// How long a consumer may hold an entry before maintenance
    /// automatically abandons it.
    pub fn visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }

    /// The timeout `dequeue` uses when the caller passes `None`.
    pub fn default_dequeue_timeout(mut self, timeout: Duration) -> Self {
        self.default_dequeue_timeout = timeout;
        self
    }

    /// Install an event handler. Replaces any previously configured handler.
    pub fn event_handler<E>(mut self, handler: E) -> Self
    where
        E: QueueEvents<T> + 'static,
    {
        self.events = Arc::new(handler);
        self
    }

    /// Install a metrics sink and the gauge name it should be reported
    /// under. A `None` metrics sink (the default) means gauges are never
    /// reported, regardless of `name`.
    pub fn metrics<M>(mut self, sink: M, gauge_name: impl Into<String>) -> Self
    where
        M: Metrics + 'static,
    {
        self.metrics = Some(Arc::new(sink));
        self.gauge_name = Some(gauge_name.into());
        self
    }

    /// Install a serializer used for deep-copying payloads on enqueue and
    /// dequeue, in place of the default `Clone`-based copy.
    pub fn serializer<S>(mut self, serializer: S) -> Self
    where
        S: Serializer<T> + 'static,
    {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Assemble the immutable [`QueueConfig`].
    pub fn build(self) -> QueueConfig<T> {
        QueueConfig {
            retry_limit: self.retry_limit,
            retry_delay: self.retry_delay,
            retry_multipliers: self.retry_multipliers,
            visibility_timeout: self.visibility_timeout,
            default_dequeue_timeout: self.default_dequeue_timeout,
            events: self.events,
            metrics: self.metrics,
            gauge_name: self.gauge_name,
            serializer: self.serializer,
        }
    }
}

impl<T: Send + Sync + 'static> Default for QueueConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
