//! `Node`: the worker set bound to one backend, plus its health probe.

use crate::config::NodeConfig;
use crate::events::NodeEvent;
use crate::proxy::proxy_request;
use crate::stats::{NodeStats, NodeStatsInner};
use parking_lot::Mutex;
use plb_core::error::ProxyError;
use plb_core::events::EventListeners;
use plb_core::{SimRequest, SimResponse};
use plb_queue::PrioQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// One backend, its shared HTTP client, and the generation of worker tasks
/// currently pulling work off the shared [`PrioQueue`] on its behalf.
///
/// `start_workers`/`stop_workers` are idempotent: calling `start_workers` on
/// an already-running node cancels the previous generation and replaces it,
/// which is the safe-replace behavior the pool relies on when a health
/// transition flips a node back to healthy while workers are still mid-spin-down.
/// Called with each attempt's outcome instead of delivering it to the
/// client directly. The default (installed by [`Node::new`]) delivers
/// unconditionally; a pool managing several nodes over one shared queue
/// installs one that re-pushes retryable failures instead.
pub type CompletionHook = Arc<dyn Fn(SimRequest, SimResponse) + Send + Sync>;

fn deliver_directly(req: SimRequest, resp: SimResponse) {
    let delivered = req.send_response(resp);
    if !delivered {
        #[cfg(feature = "tracing")]
        tracing::debug!(request_id = req.id(), "client gave up before response delivery");
    }
}

pub struct Node {
    config: Arc<NodeConfig>,
    client: reqwest::Client,
    queue: Arc<PrioQueue>,
    cur_workers: Arc<AtomicUsize>,
    worker_cancel: Mutex<Option<CancellationToken>>,
    stats: Arc<NodeStatsInner>,
    event_listeners: Arc<EventListeners<NodeEvent>>,
    on_complete: CompletionHook,
}

impl Node {
    pub fn new(
        config: NodeConfig,
        queue: Arc<PrioQueue>,
        event_listeners: Arc<EventListeners<NodeEvent>>,
    ) -> Self {
        Self::with_completion_hook(config, queue, event_listeners, Arc::new(deliver_directly))
    }

    /// Like [`Node::new`], but routes every attempt's outcome through
    /// `on_complete` instead of delivering it straight to the client.
    pub fn with_completion_hook(
        config: NodeConfig,
        queue: Arc<PrioQueue>,
        event_listeners: Arc<EventListeners<NodeEvent>>,
        on_complete: CompletionHook,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
            queue,
            cur_workers: Arc::new(AtomicUsize::new(0)),
            worker_cancel: Mutex::new(None),
            stats: Arc::new(NodeStatsInner::new()),
            event_listeners,
            on_complete,
        }
    }

    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    pub fn stats(&self) -> NodeStats {
        self.stats.snapshot()
    }

    /// Spawns `config.num_workers` tasks pulling from the shared queue.
    /// Replaces any previously running generation, cancelling it first.
    pub fn start_workers(&self) {
        let cancel = CancellationToken::new();
        let previous = self.worker_cancel.lock().replace(cancel.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        for _ in 0..self.config.num_workers {
            let config = Arc::clone(&self.config);
            let client = self.client.clone();
            let queue = Arc::clone(&self.queue);
            let cur_workers = Arc::clone(&self.cur_workers);
            let stats = Arc::clone(&self.stats);
            let event_listeners = Arc::clone(&self.event_listeners);
            let on_complete = Arc::clone(&self.on_complete);
            let worker_cancel = cancel.clone();

            cur_workers.fetch_add(1, Ordering::Relaxed);
            stats.set_cur_workers(cur_workers.load(Ordering::Relaxed));

            tokio::spawn(async move {
                worker_loop(
                    config,
                    client,
                    queue,
                    worker_cancel.clone(),
                    stats.clone(),
                    event_listeners,
                    on_complete,
                )
                .await;
                cur_workers.fetch_sub(1, Ordering::Relaxed);
                stats.set_cur_workers(cur_workers.load(Ordering::Relaxed));
            });
        }

        self.event_listeners.emit(&NodeEvent::WorkersStarted {
            node_uri: self.config.uri.clone(),
            timestamp: Instant::now(),
            num_workers: self.config.num_workers,
        });
    }

    /// Signals the current worker generation to exit after finishing any
    /// in-flight request. Does not wait for them to actually stop.
    pub fn stop_workers(&self) {
        if let Some(cancel) = self.worker_cancel.lock().take() {
            cancel.cancel();
        }
        self.event_listeners.emit(&NodeEvent::WorkersStopped {
            node_uri: self.config.uri.clone(),
            timestamp: Instant::now(),
        });
    }

    /// Like [`Node::stop_workers`], but waits for every worker of the
    /// current generation to actually exit.
    pub async fn stop_workers_and_wait(&self) {
        self.stop_workers();
        while self.cur_workers.load(Ordering::Relaxed) > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Sends the configured health probe and reports whether the node
    /// responded successfully within `health_check_timeout`.
    pub async fn health_check(&self) -> bool {
        let (req, rx) = SimRequest::new(
            "__health_check__",
            self.config.health_probe_body.clone(),
            false,
            false,
            CancellationToken::new(),
        );
        drop(rx);

        let resp = proxy_request(
            &self.client,
            &self.config.uri,
            &req,
            self.config.health_check_timeout,
            req.cancel_token(),
        )
        .await;

        let healthy = resp.is_success();
        self.stats.record_health_check(healthy);

        if healthy {
            self.event_listeners.emit(&NodeEvent::HealthCheckPassed {
                node_uri: self.config.uri.clone(),
                timestamp: Instant::now(),
                latency: resp.sim_duration,
            });
        } else {
            self.event_listeners.emit(&NodeEvent::HealthCheckFailed {
                node_uri: self.config.uri.clone(),
                timestamp: Instant::now(),
                reason: resp
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }

        healthy
    }
}

async fn worker_loop(
    config: Arc<NodeConfig>,
    client: reqwest::Client,
    queue: Arc<PrioQueue>,
    cancel: CancellationToken,
    stats: Arc<NodeStatsInner>,
    event_listeners: Arc<EventListeners<NodeEvent>>,
    on_complete: CompletionHook,
) {
    loop {
        let req = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            popped = queue.pop() => match popped {
                Some(req) => req,
                None => return,
            },
        };

        handle_request(&config, &client, req, &stats, &event_listeners, &on_complete).await;
    }
}

/// One request's worker-side lifecycle, per the seven-step worker contract:
/// drop if cancelled, drop if aged past the queue timeout, otherwise proxy
/// it and deliver the result. Deliberately does not race the outbound call
/// against this worker's own cancellation token — only the request's own
/// context and `proxy_request_timeout` bound it, so an in-flight attempt is
/// never aborted by a node-level `stop_workers` call.
async fn handle_request(
    config: &NodeConfig,
    client: &reqwest::Client,
    req: SimRequest,
    stats: &NodeStatsInner,
    event_listeners: &EventListeners<NodeEvent>,
    on_complete: &CompletionHook,
) {
    if req.is_cancelled() {
        return;
    }

    if req.age() > config.request_timeout {
        on_complete(
            req.clone(),
            SimResponse::terminal(ProxyError::RequestTimeout { waited: req.age() }),
        );
        return;
    }

    let tries = req.increment_tries();
    let timeout = req.outbound_deadline(config.proxy_request_timeout);
    let resp = proxy_request(client, &config.uri, &req, timeout, req.cancel_token()).await;

    if resp.is_success() {
        stats.record_success();
        event_listeners.emit(&NodeEvent::RequestSucceeded {
            node_uri: config.uri.clone(),
            timestamp: Instant::now(),
            tries,
        });
    } else {
        stats.record_failure();
        event_listeners.emit(&NodeEvent::RequestFailed {
            node_uri: config.uri.clone(),
            timestamp: Instant::now(),
            tries,
            retryable: resp.should_retry(),
        });
    }

    on_complete(req, resp);
}
