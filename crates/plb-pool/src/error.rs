//! Errors raised by pool management operations.

use crate::node_id::NodeId;

/// Errors from registering or removing nodes in a [`crate::NodePool`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PoolError {
    #[error("no node registered with id {0:?}")]
    UnknownNode(NodeId),

    #[error("pool has no nodes registered")]
    Empty,
}
