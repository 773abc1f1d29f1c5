//! `NodePool`: node registry, health-check loop, and retry routing over one
//! shared [`PrioQueue`].

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::events::PoolEvent;
use crate::node_id::NodeId;
use parking_lot::RwLock;
use plb_core::events::EventListeners;
use plb_core::{SimRequest, SimResponse};
use plb_node::events::NodeEvent;
use plb_node::{Node, NodeConfig};
use plb_queue::PrioQueue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The outcome of applying the retry policy to one attempt's result.
#[derive(Debug)]
pub enum RetryOutcome {
    /// The response was handed to the request's own response channel.
    Delivered,
    /// The request was re-pushed onto the shared queue for another attempt.
    Retried { attempt: u32 },
}

/// Owns the shared queue, every registered node, and the background
/// health-check loop. This is the façade a host binds its ingress to.
pub struct NodePool {
    queue: Arc<PrioQueue>,
    config: PoolConfig,
    nodes: RwLock<HashMap<NodeId, Arc<Node>>>,
    event_listeners: Arc<EventListeners<PoolEvent>>,
    node_event_listeners: Arc<EventListeners<NodeEvent>>,
    health_loop_cancel: RwLock<Option<CancellationToken>>,
    health_loop_handle: RwLock<Option<JoinHandle<()>>>,
}

impl NodePool {
    pub fn new(queue: Arc<PrioQueue>, config: PoolConfig) -> Arc<Self> {
        Arc::new(Self {
            queue,
            config,
            nodes: RwLock::new(HashMap::new()),
            event_listeners: Arc::new(EventListeners::new()),
            node_event_listeners: Arc::new(EventListeners::new()),
            health_loop_cancel: RwLock::new(None),
            health_loop_handle: RwLock::new(None),
        })
    }

    /// Registers a new node, wired with the pool's retry-aware completion
    /// hook, and immediately starts its worker pool.
    pub fn add_node(self: &Arc<Self>, config: NodeConfig) -> NodeId {
        let id = NodeId::next();
        let uri = config.uri.clone();
        let pool = Arc::clone(self);

        let node = Node::with_completion_hook(
            config,
            Arc::clone(&self.queue),
            Arc::clone(&self.node_event_listeners),
            Arc::new(move |req, resp| {
                pool.on_attempt_complete(req, resp);
            }),
        );
        let node = Arc::new(node);
        node.start_workers();

        self.nodes.write().insert(id, node);
        self.event_listeners.emit(&PoolEvent::NodeAdded {
            node_id: id,
            node_uri: uri,
            timestamp: Instant::now(),
        });
        id
    }

    /// Stops the node's workers and removes it from the registry.
    pub async fn remove_node(&self, id: NodeId) -> Result<(), PoolError> {
        let node = self.nodes.write().remove(&id).ok_or(PoolError::UnknownNode(id))?;
        node.stop_workers_and_wait().await;
        self.event_listeners.emit(&PoolEvent::NodeRemoved {
            node_id: id,
            node_uri: node.uri().to_string(),
            timestamp: Instant::now(),
        });
        Ok(())
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.read().keys().copied().collect()
    }

    /// The retry policy: a retryable failure under `max_retries` is re-pushed
    /// onto the shared queue for pickup by any node (possibly a different
    /// one); everything else is delivered to the request's own channel.
    ///
    /// A retry re-push does not reset `created_at` — the queue-age timeout
    /// budgets the logical request across all of its attempts, not each one.
    fn on_attempt_complete(&self, req: SimRequest, resp: SimResponse) -> RetryOutcome {
        let attempt = req.tries();
        if resp.should_retry() && attempt <= self.config.max_retries {
            self.event_listeners.emit(&PoolEvent::RetryScheduled {
                node_uri: resp.node_uri.clone(),
                timestamp: Instant::now(),
                attempt,
            });
            // A full sub-queue on retry is terminal: the client must see
            // QueueFull, not the retryable failure that triggered the retry,
            // so it doesn't loop on a tag that says "try again".
            if let Err(err) = self.queue.push(req.clone()) {
                req.send_response(SimResponse::terminal(err));
                return RetryOutcome::Delivered;
            }
            return RetryOutcome::Retried { attempt };
        }

        if resp.should_retry() {
            self.event_listeners.emit(&PoolEvent::RetriesExhausted {
                node_uri: resp.node_uri.clone(),
                timestamp: Instant::now(),
                attempt,
            });
        }

        req.send_response(resp);
        RetryOutcome::Delivered
    }

    /// Spawns the background health-check loop. A no-op if already running.
    pub fn run_health_checks(self: &Arc<Self>) {
        let mut cancel_slot = self.health_loop_cancel.write();
        if cancel_slot.is_some() {
            return;
        }
        let cancel = CancellationToken::new();
        *cancel_slot = Some(cancel.clone());
        drop(cancel_slot);

        let pool = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(pool.config.health_check_interval);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    _ = interval.tick() => {}
                }
                pool.check_all_nodes_once().await;
            }
        });
        *self.health_loop_handle.write() = Some(handle);
    }

    async fn check_all_nodes_once(&self) {
        let nodes: Vec<(NodeId, Arc<Node>)> = self
            .nodes
            .read()
            .iter()
            .map(|(id, node)| (*id, Arc::clone(node)))
            .collect();

        let checks = nodes.into_iter().map(|(id, node)| async move {
            let healthy = node.health_check().await;
            (id, node, healthy)
        });

        for (id, node, healthy) in futures::future::join_all(checks).await {
            if healthy {
                if node.stats().cur_workers == 0 {
                    node.start_workers();
                    self.event_listeners.emit(&PoolEvent::NodeRecovered {
                        node_id: id,
                        node_uri: node.uri().to_string(),
                        timestamp: Instant::now(),
                    });
                }
            } else if node.stats().cur_workers > 0 {
                node.stop_workers();
                self.event_listeners.emit(&PoolEvent::NodeMarkedUnhealthy {
                    node_id: id,
                    node_uri: node.uri().to_string(),
                    timestamp: Instant::now(),
                });
            }
        }
    }

    /// Drains the shared queue, then stops every node's workers. Returns
    /// once no request is left in flight.
    pub async fn shutdown(&self) {
        if let Some(cancel) = self.health_loop_cancel.write().take() {
            cancel.cancel();
        }
        if let Some(handle) = self.health_loop_handle.write().take() {
            let _ = handle.await;
        }

        self.queue.close_and_wait().await;

        let nodes: Vec<Arc<Node>> = self.nodes.read().values().cloned().collect();
        for node in nodes {
            node.stop_workers_and_wait().await;
        }
    }
}
