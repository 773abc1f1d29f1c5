//! Point-in-time instrumentation snapshot for a [`crate::Node`].

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Internal counters updated by worker tasks and the health-check loop.
/// Cheap to read concurrently; never blocks a worker.
pub(crate) struct NodeStatsInner {
    cur_workers: AtomicUsize,
    requests_proxied: AtomicU64,
    requests_failed: AtomicU64,
    last_health_check: Mutex<Option<Instant>>,
    healthy: std::sync::atomic::AtomicBool,
}

impl NodeStatsInner {
    pub(crate) fn new() -> Self {
        Self {
            cur_workers: AtomicUsize::new(0),
            requests_proxied: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            last_health_check: Mutex::new(None),
            healthy: std::sync::atomic::AtomicBool::new(true),
        }
    }

    pub(crate) fn set_cur_workers(&self, n: usize) {
        self.cur_workers.store(n, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.requests_proxied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_health_check(&self, healthy: bool) {
        *self.last_health_check.lock() = Some(Instant::now());
        self.healthy.store(healthy, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> NodeStats {
        NodeStats {
            cur_workers: self.cur_workers.load(Ordering::Relaxed),
            requests_proxied: self.requests_proxied.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            last_health_check: *self.last_health_check.lock(),
            healthy: self.healthy.load(Ordering::Relaxed),
        }
    }
}

/// A consistent snapshot of a node's counters, returned by [`crate::Node::stats`].
#[derive(Debug, Clone, Copy)]
pub struct NodeStats {
    pub cur_workers: usize,
    pub requests_proxied: u64,
    pub requests_failed: u64,
    pub last_health_check: Option<Instant>,
    pub healthy: bool,
}
