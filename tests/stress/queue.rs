use bytes::Bytes;
use plb_core::SimRequest;
use plb_queue::{PrioQueue, PrioQueueConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn request(is_high: bool, is_fast: bool) -> SimRequest {
    let (req, _rx) = SimRequest::new("stress", Bytes::new(), is_high, is_fast, CancellationToken::new());
    req
}

/// 32 concurrent pushers and 32 concurrent poppers against one queue; every
/// pushed request must be popped exactly once, with no deadlock and no
/// panic, inside a generous wall-clock bound.
#[tokio::test]
#[ignore]
async fn many_concurrent_pushers_and_poppers_drain_cleanly() {
    const PUSHERS: usize = 32;
    const PER_PUSHER: usize = 2_000;
    const TOTAL: usize = PUSHERS * PER_PUSHER;

    let queue = Arc::new(PrioQueue::new(
        PrioQueueConfig::builder().high_prio_per_fast_track(3).build(),
    ));

    let pushers: Vec<_> = (0..PUSHERS)
        .map(|i| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                for j in 0..PER_PUSHER {
                    let class = (i + j) % 3;
                    queue
                        .push(request(class == 0, class == 1))
                        .expect("unbounded queue never rejects");
                }
            })
        })
        .collect();

    let poppers: Vec<_> = (0..PUSHERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut n = 0usize;
                while n < PER_PUSHER {
                    if queue.pop().await.is_some() {
                        n += 1;
                    }
                }
                n
            })
        })
        .collect();

    for pusher in pushers {
        pusher.await.unwrap();
    }

    let popped: usize = futures::future::join_all(poppers)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .sum();

    assert_eq!(popped, TOTAL);
    assert_eq!(queue.num_requests(), 0);
}

/// `close_and_wait` must return promptly even while producers keep pushing
/// up until the moment it is called, and no pop after close may hang.
#[tokio::test]
#[ignore]
async fn close_and_wait_terminates_under_concurrent_load() {
    let queue = Arc::new(PrioQueue::new(PrioQueueConfig::builder().build()));

    let writer_queue = Arc::clone(&queue);
    let writer = tokio::spawn(async move {
        for _ in 0..10_000 {
            let _ = writer_queue.push(request(false, false));
        }
    });

    let reader_queue = Arc::clone(&queue);
    let reader = tokio::spawn(async move {
        let mut n = 0;
        while reader_queue.pop().await.is_some() {
            n += 1;
        }
        n
    });

    writer.await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), queue.close_and_wait())
        .await
        .expect("close_and_wait must not hang");
    reader.await.unwrap();
}
