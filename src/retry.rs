//! Retry backoff computation.
//!
//! The actual delayed re-insertion (spawning the `tokio::time::sleep` task
//! and re-appending to the ready list) lives in [`crate::queue::Queue::abandon`],
//! since it needs access to the queue's ready list and signal. This module
//! isolates the pure backoff-schedule arithmetic so it can be tested without
//! spinning up a runtime.

use std::time::Duration;

/// Compute the retry delay for an entry that has just been abandoned with
/// `attempts` prior deliveries, per `delay = base × multipliers[min(attempts, k)]`
/// (1-indexed, clamped to the last entry in the schedule).
pub(crate) fn backoff_delay(base: Duration, multipliers: &[u32], attempts: u32) -> Duration {
    debug_assert!(!multipliers.is_empty());
    let index = (attempts.max(1) as usize).min(multipliers.len()) - 1;
    base * multipliers[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_matches_spec_example() {
        let base = Duration::from_millis(10);
        let multipliers = [1, 3, 5, 10];
        assert_eq!(backoff_delay(base, &multipliers, 1), Duration::from_millis(10));
        assert_eq!(backoff_delay(base, &multipliers, 2), Duration::from_millis(30));
        assert_eq!(backoff_delay(base, &multipliers, 3), Duration::from_millis(50));
        assert_eq!(backoff_delay(base, &multipliers, 4), Duration::from_millis(100));
    }

    #[test]
    fn attempts_beyond_schedule_reuse_last_multiplier() {
        let base = Duration::from_millis(10);
        let multipliers = [1, 3, 5, 10];
        assert_eq!(backoff_delay(base, &multipliers, 10), Duration::from_millis(100));
    }

    #[test]
    fn zero_base_delay_is_always_zero() {
        let multipliers = [1, 3, 5, 10];
        assert_eq!(backoff_delay(Duration::ZERO, &multipliers, 1), Duration::ZERO);
    }

    #[test]
    fn single_multiplier_schedule_used_for_every_attempt() {
        let base = Duration::from_millis(5);
        let multipliers = [2];
        assert_eq!(backoff_delay(base, &multipliers, 1), Duration::from_millis(10));
        assert_eq!(backoff_delay(base, &multipliers, 7), Duration::from_millis(10));
    }
}
