//! Node registry, health-check loop, and retry routing over one shared
//! priority queue.
//!
//! [`NodePool`] is the layer that turns several independent [`plb_node::Node`]
//! worker pools into one addressable backend: it owns the shared
//! [`plb_queue::PrioQueue`], decides whether a failed attempt gets re-pushed
//! for another node to pick up, and runs the periodic health probe that
//! starts and stops each node's workers.

pub mod config;
pub mod error;
pub mod events;
pub mod node_id;
pub mod pool;

pub use config::{PoolConfig, PoolConfigBuilder};
pub use error::PoolError;
pub use events::PoolEvent;
pub use node_id::NodeId;
pub use pool::{NodePool, RetryOutcome};
