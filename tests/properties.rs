//! Property-based invariants over randomized operation sequences.

use std::time::Duration;

use proptest::prelude::*;
use taskqueue::{Queue, QueueConfigBuilder};

#[derive(Debug, Clone)]
enum Op {
    Enqueue(i32),
    DequeueComplete,
    DequeueAbandon,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::Enqueue),
        Just(Op::DequeueComplete),
        Just(Op::DequeueAbandon),
    ]
}

fn run_ops(retry_limit: u32, ops: &[Op]) -> Queue<i32> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    let queue: Queue<i32> = Queue::new(
        QueueConfigBuilder::new()
            .retry_limit(retry_limit)
            .retry_delay(Duration::ZERO)
            .visibility_timeout(Duration::from_secs(60))
            .build(),
    );

    runtime.block_on(async {
        for op in ops {
            match op {
                Op::Enqueue(v) => {
                    queue.enqueue(*v).unwrap();
                }
                Op::DequeueComplete => {
                    if let Some(entry) = queue.dequeue(Some(Duration::ZERO)).await.unwrap() {
                        queue.complete(entry.id()).unwrap();
                    }
                }
                Op::DequeueAbandon => {
                    if let Some(entry) = queue.dequeue(Some(Duration::ZERO)).await.unwrap() {
                        queue.abandon(entry.id()).unwrap();
                    }
                }
            }
        }
    });

    queue
}

proptest! {
    /// Invariant 1: ready + in_flight + dead_letter accounts for every entry
    /// still alive in the system; nothing enqueued is ever silently dropped.
    #[test]
    fn containers_account_for_every_live_entry(ops in proptest::collection::vec(op_strategy(), 0..50)) {
        let queue = run_ops(2, &ops);
        let enqueued = queue.enqueued_count();
        let completed = queue.completed_count();
        let live = queue.ready_count() as u64 + queue.in_flight_count() as u64 + queue.dead_letter_count() as u64;
        prop_assert_eq!(live + completed, enqueued);
    }

    /// Invariant 3: every delivered entry's attempt count is in [1, R+1].
    #[test]
    fn attempts_stay_within_retry_budget(ops in proptest::collection::vec(op_strategy(), 0..50)) {
        let retry_limit = 2u32;
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let queue: Queue<i32> = Queue::new(
            QueueConfigBuilder::new()
                .retry_limit(retry_limit)
                .retry_delay(Duration::ZERO)
                .visibility_timeout(Duration::from_secs(60))
                .build(),
        );

        runtime.block_on(async {
            for op in &ops {
                match op {
                    Op::Enqueue(v) => { queue.enqueue(*v).unwrap(); }
                    Op::DequeueComplete => {
                        if let Some(entry) = queue.dequeue(Some(Duration::ZERO)).await.unwrap() {
                            prop_assert!(entry.attempts() >= 1 && entry.attempts() <= retry_limit + 1);
                            queue.complete(entry.id()).unwrap();
                        }
                    }
                    Op::DequeueAbandon => {
                        if let Some(entry) = queue.dequeue(Some(Duration::ZERO)).await.unwrap() {
                            prop_assert!(entry.attempts() >= 1 && entry.attempts() <= retry_limit + 1);
                            queue.abandon(entry.id()).unwrap();
                        }
                    }
                }
            }
            Ok(())
        })?;
    }

    /// Invariant 4: once dead-lettered, an id never reappears via dequeue.
    #[test]
    fn dead_lettered_entries_are_never_redelivered(seed in any::<i32>()) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let queue: Queue<i32> = Queue::new(
            QueueConfigBuilder::new()
                .retry_limit(1)
                .retry_delay(Duration::ZERO)
                .visibility_timeout(Duration::from_secs(60))
                .build(),
        );

        runtime.block_on(async {
            queue.enqueue(seed).unwrap();
            for _ in 0..2 {
                let entry = queue.dequeue(Some(Duration::from_millis(50))).await.unwrap().unwrap();
                queue.abandon(entry.id()).unwrap();
            }
            prop_assert_eq!(queue.dead_letter_count(), 1);
            let redelivered = queue.dequeue(Some(Duration::from_millis(20))).await.unwrap();
            prop_assert!(redelivered.is_none());
            Ok(())
        })?;
    }

    /// Invariant 6: a vetoed enqueue changes nothing observable.
    #[test]
    fn vetoed_enqueue_is_a_no_op(value in any::<i32>()) {
        struct Vetoer;
        impl taskqueue::QueueEvents<i32> for Vetoer {
            fn before_enqueue(&self, _queue_id: &str, _payload: &i32) -> bool {
                false
            }
        }

        let queue: Queue<i32> = Queue::new(
            QueueConfigBuilder::new().event_handler(Vetoer).build(),
        );
        let result = queue.enqueue(value).unwrap();
        prop_assert!(result.is_none());
        prop_assert_eq!(queue.ready_count(), 0);
        prop_assert_eq!(queue.enqueued_count(), 0);
    }
}

proptest! {
    // Each case sleeps out a real visibility timeout, so keep the case
    // count small; the randomized `vt_ms` already covers the interesting
    // range without needing hundreds of runs.
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Invariant 5: an in-flight entry whose visibility timeout has elapsed
    /// is reclaimed by maintenance within a bounded delay, for any timeout
    /// in the tested range.
    #[test]
    fn expired_visibility_timeout_is_reclaimed_within_bounded_delay(vt_ms in 20u64..150) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let visibility_timeout = Duration::from_millis(vt_ms);
        let queue: Queue<i32> = Queue::new(
            QueueConfigBuilder::new()
                .retry_limit(5)
                .retry_delay(Duration::ZERO)
                .visibility_timeout(visibility_timeout)
                .build(),
        );

        runtime.block_on(async {
            queue.enqueue(1).unwrap();
            queue.dequeue(Some(Duration::ZERO)).await.unwrap().unwrap();
            prop_assert_eq!(queue.in_flight_count(), 1);

            let bound = visibility_timeout + Duration::from_millis(500);
            let deadline = std::time::Instant::now() + bound;
            while std::time::Instant::now() < deadline && queue.in_flight_count() != 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }

            prop_assert_eq!(queue.in_flight_count(), 0, "entry not reclaimed within {:?}", bound);
            prop_assert_eq!(queue.worker_timeout_count(), 1);
            Ok(())
        })?;
    }
}
