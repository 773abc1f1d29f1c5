//! Prioritized load balancer: a three-class priority queue dispatching
//! requests over a pool of JSON-RPC backend nodes.
//!
//! This crate is the single embedding point — [`LoadBalancer`] wires
//! together `plb-queue`'s [`plb_queue::PrioQueue`] and `plb-pool`'s
//! [`plb_pool::NodePool`] and exposes the result both as a plain async API
//! ([`LoadBalancer::dispatch`]) and as a [`tower_service::Service`].

pub mod balancer;

pub use balancer::{Call, LoadBalancer};

/// Re-exports of the types most host binaries need, without reaching into
/// each `plb-*` crate individually.
pub mod prelude {
    pub use crate::{Call, LoadBalancer};
    pub use plb_core::error::{ProxyError, ProxyErrorKind};
    pub use plb_core::{SimRequest, SimResponse};
    pub use plb_node::{NodeConfig, NodeConfigBuilder};
    pub use plb_pool::{NodeId, PoolConfig, PoolConfigBuilder};
    pub use plb_queue::{PrioQueueConfig, PrioQueueConfigBuilder};
}
