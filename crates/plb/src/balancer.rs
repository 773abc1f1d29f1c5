//! [`LoadBalancer`]: the façade that wires a [`PrioQueue`] to a [`NodePool`]
//! and exposes the whole thing as a [`tower_service::Service`].

use bytes::Bytes;
use futures::future::BoxFuture;
use plb_core::error::ProxyError;
use plb_core::{SimRequest, SimResponse};
use plb_node::NodeConfig;
use plb_pool::{NodeId, NodePool, PoolConfig};
use plb_queue::PrioQueueConfig;
use plb_queue::PrioQueue;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_service::Service;

/// One inbound call, as accepted by [`LoadBalancer`]'s `Service` impl.
#[derive(Debug, Clone)]
pub struct Call {
    pub id: String,
    pub payload: Bytes,
    pub is_high_prio: bool,
    pub is_fast_track: bool,
    pub cancel_token: CancellationToken,
    pub ctx_remaining: Option<Duration>,
}

impl Call {
    pub fn new(id: impl Into<String>, payload: Bytes) -> Self {
        Self {
            id: id.into(),
            payload,
            is_high_prio: false,
            is_fast_track: false,
            cancel_token: CancellationToken::new(),
            ctx_remaining: None,
        }
    }

    pub fn high_prio(mut self) -> Self {
        self.is_high_prio = true;
        self
    }

    pub fn fast_track(mut self) -> Self {
        self.is_fast_track = true;
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_remaining_budget(mut self, remaining: Duration) -> Self {
        self.ctx_remaining = Some(remaining);
        self
    }
}

/// Combines a shared [`PrioQueue`] with a [`NodePool`] dispatching over it.
///
/// This is the single embedding point for a host binary: construct one,
/// register backends with [`LoadBalancer::add_node`], start the health-check
/// loop, and either call [`LoadBalancer::dispatch`] directly or drive it
/// through the [`tower_service::Service`] impl.
pub struct LoadBalancer {
    queue: Arc<PrioQueue>,
    pool: Arc<NodePool>,
}

impl LoadBalancer {
    pub fn new(queue_config: PrioQueueConfig, pool_config: PoolConfig) -> Self {
        let queue = Arc::new(PrioQueue::new(queue_config));
        let pool = NodePool::new(Arc::clone(&queue), pool_config);
        Self { queue, pool }
    }

    pub fn add_node(&self, config: NodeConfig) -> NodeId {
        self.pool.add_node(config)
    }

    pub async fn remove_node(&self, id: NodeId) -> Result<(), plb_pool::PoolError> {
        self.pool.remove_node(id).await
    }

    /// Starts the background health-check loop, idempotently.
    pub fn run_health_checks(&self) {
        self.pool.run_health_checks();
    }

    pub fn queue(&self) -> &Arc<PrioQueue> {
        &self.queue
    }

    /// Pushes `call` onto the shared queue and awaits its response.
    pub async fn dispatch(&self, call: Call) -> Result<SimResponse, ProxyError> {
        let (req, rx) = SimRequest::with_deadline(
            call.id,
            call.payload,
            call.is_high_prio,
            call.is_fast_track,
            call.cancel_token,
            call.ctx_remaining,
        );

        self.queue.push(req)?;

        rx.await.map_err(|_| ProxyError::Cancelled)
    }

    /// Drains the queue and stops every node. Returns once nothing is left
    /// in flight.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

impl Service<Call> for LoadBalancer {
    type Response = SimResponse;
    type Error = ProxyError;
    type Future = BoxFuture<'static, Result<SimResponse, ProxyError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: Call) -> Self::Future {
        let queue = Arc::clone(&self.queue);
        Box::pin(async move {
            let (req, rx) = SimRequest::with_deadline(
                call.id,
                call.payload,
                call.is_high_prio,
                call.is_fast_track,
                call.cancel_token,
                call.ctx_remaining,
            );
            queue.push(req)?;
            rx.await.map_err(|_| ProxyError::Cancelled)
        })
    }
}
