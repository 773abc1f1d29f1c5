//! Events emitted by a [`crate::NodePool`].

use crate::node_id::NodeId;
use plb_core::events::DispatchEvent;
use std::time::Instant;

/// Pool-level lifecycle and retry events.
#[derive(Debug, Clone)]
pub enum PoolEvent {
    NodeAdded {
        node_id: NodeId,
        node_uri: String,
        timestamp: Instant,
    },
    NodeRemoved {
        node_id: NodeId,
        node_uri: String,
        timestamp: Instant,
    },
    NodeMarkedUnhealthy {
        node_id: NodeId,
        node_uri: String,
        timestamp: Instant,
    },
    NodeRecovered {
        node_id: NodeId,
        node_uri: String,
        timestamp: Instant,
    },
    RetryScheduled {
        node_uri: String,
        timestamp: Instant,
        attempt: u32,
    },
    RetriesExhausted {
        node_uri: String,
        timestamp: Instant,
        attempt: u32,
    },
}

impl DispatchEvent for PoolEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PoolEvent::NodeAdded { .. } => "node_added",
            PoolEvent::NodeRemoved { .. } => "node_removed",
            PoolEvent::NodeMarkedUnhealthy { .. } => "node_marked_unhealthy",
            PoolEvent::NodeRecovered { .. } => "node_recovered",
            PoolEvent::RetryScheduled { .. } => "retry_scheduled",
            PoolEvent::RetriesExhausted { .. } => "retries_exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            PoolEvent::NodeAdded { timestamp, .. }
            | PoolEvent::NodeRemoved { timestamp, .. }
            | PoolEvent::NodeMarkedUnhealthy { timestamp, .. }
            | PoolEvent::NodeRecovered { timestamp, .. }
            | PoolEvent::RetryScheduled { timestamp, .. }
            | PoolEvent::RetriesExhausted { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            PoolEvent::NodeAdded { node_uri, .. }
            | PoolEvent::NodeRemoved { node_uri, .. }
            | PoolEvent::NodeMarkedUnhealthy { node_uri, .. }
            | PoolEvent::NodeRecovered { node_uri, .. }
            | PoolEvent::RetryScheduled { node_uri, .. }
            | PoolEvent::RetriesExhausted { node_uri, .. } => node_uri,
        }
    }
}
