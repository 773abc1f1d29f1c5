use bytes::Bytes;
use plb_core::SimRequest;
use plb_node::NodeConfig;
use plb_pool::{NodePool, PoolConfig};
use plb_queue::{PrioQueue, PrioQueueConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Several nodes, heavy concurrent load, one node flapping unhealthy
/// mid-run: every request must still receive exactly one response within a
/// generous bound, and the pool must shut down cleanly afterward.
#[tokio::test]
#[ignore]
async fn pool_survives_a_flapping_node_under_load() {
    const REQUESTS: usize = 5_000;

    let stable = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&stable)
        .await;

    let flappy = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&flappy)
        .await;

    let queue = Arc::new(PrioQueue::new(PrioQueueConfig::builder().build()));
    let pool = NodePool::new(
        Arc::clone(&queue),
        PoolConfig::builder()
            .max_retries(3)
            .health_check_interval(Duration::from_millis(20))
            .build(),
    );
    pool.add_node(NodeConfig::builder(stable.uri()).num_workers(8).build());
    pool.add_node(NodeConfig::builder(flappy.uri()).num_workers(8).build());
    pool.run_health_checks();

    let mut receivers = Vec::with_capacity(REQUESTS);
    for i in 0..REQUESTS {
        let (req, rx) = SimRequest::new(
            format!("r{i}"),
            Bytes::new(),
            i % 7 == 0,
            i % 11 == 0,
            CancellationToken::new(),
        );
        queue.push(req).unwrap();
        receivers.push(rx);
    }

    for rx in receivers {
        tokio::time::timeout(Duration::from_secs(10), rx)
            .await
            .expect("every request must receive exactly one response")
            .unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), pool.shutdown())
        .await
        .expect("shutdown must not hang");
}
