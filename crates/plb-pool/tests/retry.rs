use bytes::Bytes;
use plb_core::SimRequest;
use plb_node::NodeConfig;
use plb_pool::{NodePool, PoolConfig};
use plb_queue::PrioQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn transient_failure_is_retried_and_eventually_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
        .mount(&server)
        .await;

    let queue = Arc::new(PrioQueue::new(plb_queue::PrioQueueConfig::builder().build()));
    let pool = NodePool::new(Arc::clone(&queue), PoolConfig::builder().max_retries(2).build());
    pool.add_node(NodeConfig::builder(server.uri()).num_workers(1).build());

    let (req, rx) = SimRequest::new("r1", Bytes::from_static(b"{}"), false, false, CancellationToken::new());
    queue.push(req).unwrap();

    let resp = tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("should eventually deliver")
        .unwrap();
    assert!(resp.is_success());

    pool.shutdown().await;
}

#[tokio::test]
async fn retries_exhausted_delivers_last_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let queue = Arc::new(PrioQueue::new(plb_queue::PrioQueueConfig::builder().build()));
    let pool = NodePool::new(Arc::clone(&queue), PoolConfig::builder().max_retries(1).build());
    pool.add_node(NodeConfig::builder(server.uri()).num_workers(1).build());

    let (req, rx) = SimRequest::new("r1", Bytes::from_static(b"{}"), false, false, CancellationToken::new());
    queue.push(req).unwrap();

    let resp = tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("should eventually deliver")
        .unwrap();
    assert!(!resp.is_success());
    assert_eq!(resp.status_code, 503);

    pool.shutdown().await;
}

#[tokio::test]
async fn retry_repush_into_full_queue_delivers_terminal_queue_full() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;

    let queue = Arc::new(PrioQueue::new(
        plb_queue::PrioQueueConfig::builder().max_low_prio(1).build(),
    ));
    let pool = NodePool::new(Arc::clone(&queue), PoolConfig::builder().max_retries(3).build());
    pool.add_node(NodeConfig::builder(server.uri()).num_workers(1).build());

    let (req, rx) = SimRequest::new("r1", Bytes::from_static(b"{}"), false, false, CancellationToken::new());
    queue.push(req).unwrap();

    // Let the worker pick up `req` (vacating the capacity-1 sub-queue)
    // before filling it back up, so the retry re-push observes it full.
    tokio::time::sleep(Duration::from_millis(15)).await;
    let (filler, _filler_rx) = SimRequest::new("filler", Bytes::new(), false, false, CancellationToken::new());
    queue.push(filler).unwrap();

    let resp = tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("should deliver a terminal response")
        .unwrap();

    assert!(!resp.is_success());
    assert!(resp.error.as_ref().unwrap().is_queue_full());
    assert!(!resp.should_retry());

    pool.shutdown().await;
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad"))
        .expect(1)
        .mount(&server)
        .await;

    let queue = Arc::new(PrioQueue::new(plb_queue::PrioQueueConfig::builder().build()));
    let pool = NodePool::new(Arc::clone(&queue), PoolConfig::builder().max_retries(3).build());
    pool.add_node(NodeConfig::builder(server.uri()).num_workers(1).build());

    let (req, rx) = SimRequest::new("r1", Bytes::from_static(b"{}"), false, false, CancellationToken::new());
    queue.push(req).unwrap();

    let resp = tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("should deliver immediately")
        .unwrap();
    assert_eq!(resp.status_code, 400);

    pool.shutdown().await;
}
