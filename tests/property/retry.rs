//! Property tests for the pool's retry cap.
//!
//! Invariant tested: for any number of consecutive transient backend
//! failures and any configured `max_retries`, the caller receives exactly
//! one response, and it is a success iff the backend recovered at or
//! before attempt `max_retries + 1`.

use bytes::Bytes;
use plb_core::SimRequest;
use plb_node::NodeConfig;
use plb_pool::{NodePool, PoolConfig};
use plb_queue::{PrioQueue, PrioQueueConfig};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

struct FailNTimes {
    remaining: AtomicUsize,
}

impl Respond for FailNTimes {
    fn respond(&self, _: &wiremock::Request) -> ResponseTemplate {
        let prev = self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            Some(n.saturating_sub(1))
        });
        match prev {
            Ok(0) | Err(_) => ResponseTemplate::new(200).set_body_string("{}"),
            Ok(_) => ResponseTemplate::new(503),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn exactly_one_response_delivered_regardless_of_failure_count(
        failures_before_success in 0usize..4,
        max_retries in 0u32..4,
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/"))
                .respond_with(FailNTimes { remaining: AtomicUsize::new(failures_before_success) })
                .mount(&server)
                .await;

            let queue = Arc::new(PrioQueue::new(PrioQueueConfig::builder().build()));
            let pool = NodePool::new(Arc::clone(&queue), PoolConfig::builder().max_retries(max_retries).build());
            pool.add_node(NodeConfig::builder(server.uri()).num_workers(1).build());

            let (req, rx) = SimRequest::new("r", Bytes::new(), false, false, CancellationToken::new());
            queue.push(req).unwrap();

            let resp = tokio::time::timeout(Duration::from_secs(5), rx).await;
            pool.shutdown().await;

            let resp = resp.expect("exactly one response must arrive").expect("channel not dropped");

            if failures_before_success as u32 <= max_retries {
                prop_assert!(resp.is_success());
            } else {
                prop_assert!(!resp.is_success());
            }
            Ok(())
        })?;
    }
}
