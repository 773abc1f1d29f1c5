//! Property tests for `PrioQueue`.
//!
//! Invariants tested:
//! - Every pushed request is eventually popped exactly once.
//! - `num_requests` always equals the sum of the three class lengths.
//! - Within one class, pop order is FIFO.
//! - A bounded sub-queue never exceeds its configured capacity.

use bytes::Bytes;
use plb_core::SimRequest;
use plb_queue::{PrioQueue, PrioQueueConfig};
use proptest::prelude::*;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

fn request(id: usize, is_high: bool, is_fast: bool) -> SimRequest {
    let (req, _rx) = SimRequest::new(
        format!("req-{id}"),
        Bytes::new(),
        is_high,
        is_fast,
        CancellationToken::new(),
    );
    req
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_pushed_request_is_popped_exactly_once(
        classes in prop::collection::vec(0u8..3, 1..200),
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let queue = PrioQueue::new(PrioQueueConfig::builder().build());
            for (i, class) in classes.iter().enumerate() {
                let req = request(i, *class == 0, *class == 1);
                queue.push(req).unwrap();
            }

            let mut seen = std::collections::HashSet::new();
            for _ in 0..classes.len() {
                let req = queue.pop().await.unwrap();
                prop_assert!(seen.insert(req.id().to_string()), "duplicate pop");
            }
            prop_assert_eq!(seen.len(), classes.len());
            prop_assert_eq!(queue.num_requests(), 0);
            Ok(())
        })?;
    }

    #[test]
    fn num_requests_matches_sum_of_class_lengths_after_every_push(
        classes in prop::collection::vec(0u8..3, 0..200),
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let queue = PrioQueue::new(PrioQueueConfig::builder().build());
            for (i, class) in classes.iter().enumerate() {
                let req = request(i, *class == 0, *class == 1);
                queue.push(req).unwrap();
                let (fast, high, low) = queue.class_lengths();
                prop_assert_eq!(queue.num_requests(), fast + high + low);
            }
            Ok(())
        })?;
    }

    #[test]
    fn low_prio_pops_preserve_fifo_order(
        count in 1usize..100,
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let queue = PrioQueue::new(PrioQueueConfig::builder().build());
            for i in 0..count {
                queue.push(request(i, false, false)).unwrap();
            }
            for i in 0..count {
                let req = queue.pop().await.unwrap();
                prop_assert_eq!(req.id(), format!("req-{i}"));
            }
            Ok(())
        })?;
    }

    #[test]
    fn bounded_sub_queue_never_exceeds_capacity(
        capacity in 1usize..20,
        attempts in 1usize..50,
    ) {
        let queue = PrioQueue::new(PrioQueueConfig::builder().max_low_prio(capacity).build());
        let mut accepted = 0;
        for i in 0..attempts {
            match queue.push(request(i, false, false)) {
                Ok(()) => accepted += 1,
                Err(e) => prop_assert!(e.is_queue_full()),
            }
            prop_assert!(queue.class_lengths().2 <= capacity);
        }
        prop_assert!(accepted <= capacity);
        prop_assert_eq!(accepted, queue.class_lengths().2);
    }
}
