//! Pluggable metrics sink.
//!
//! The queue never picks a metrics backend for you; it calls [`Metrics::gauge`]
//! on every state-changing operation when a gauge name is configured, and
//! leaves wiring that up to a real sink (statsd, prometheus, ...) to the
//! embedding application.

/// A gauge/counter receiver.
pub trait Metrics: Send + Sync {
    /// Report a gauge value under `name`.
    fn gauge(&self, name: &str, value: f64);
}

/// The default sink: discards every reading.
pub struct NoOpMetrics;

impl Metrics for NoOpMetrics {
    fn gauge(&self, _name: &str, _value: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingMetrics {
        calls: AtomicU64,
    }

    impl Metrics for CountingMetrics {
        fn gauge(&self, _name: &str, _value: f64) {
            self.calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn noop_does_not_panic() {
        NoOpMetrics.gauge("ready_count", 3.0);
    }

    #[test]
    fn custom_sink_observes_calls() {
        let sink = CountingMetrics {
            calls: AtomicU64::new(0),
        };
        sink.gauge("ready_count", 1.0);
        sink.gauge("dequeued_count", 2.0);
        assert_eq!(sink.calls.load(Ordering::Relaxed), 2);
    }
}
