//! Events emitted by a [`crate::Node`].

use plb_core::events::DispatchEvent;
use std::time::Instant;

/// Lifecycle and dispatch events for one node.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    WorkersStarted {
        node_uri: String,
        timestamp: Instant,
        num_workers: usize,
    },
    WorkersStopped {
        node_uri: String,
        timestamp: Instant,
    },
    HealthCheckPassed {
        node_uri: String,
        timestamp: Instant,
        latency: std::time::Duration,
    },
    HealthCheckFailed {
        node_uri: String,
        timestamp: Instant,
        reason: String,
    },
    RequestSucceeded {
        node_uri: String,
        timestamp: Instant,
        tries: u32,
    },
    RequestFailed {
        node_uri: String,
        timestamp: Instant,
        tries: u32,
        retryable: bool,
    },
}

impl DispatchEvent for NodeEvent {
    fn event_type(&self) -> &'static str {
        match self {
            NodeEvent::WorkersStarted { .. } => "workers_started",
            NodeEvent::WorkersStopped { .. } => "workers_stopped",
            NodeEvent::HealthCheckPassed { .. } => "health_check_passed",
            NodeEvent::HealthCheckFailed { .. } => "health_check_failed",
            NodeEvent::RequestSucceeded { .. } => "request_succeeded",
            NodeEvent::RequestFailed { .. } => "request_failed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            NodeEvent::WorkersStarted { timestamp, .. }
            | NodeEvent::WorkersStopped { timestamp, .. }
            | NodeEvent::HealthCheckPassed { timestamp, .. }
            | NodeEvent::HealthCheckFailed { timestamp, .. }
            | NodeEvent::RequestSucceeded { timestamp, .. }
            | NodeEvent::RequestFailed { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            NodeEvent::WorkersStarted { node_uri, .. }
            | NodeEvent::WorkersStopped { node_uri, .. }
            | NodeEvent::HealthCheckPassed { node_uri, .. }
            | NodeEvent::HealthCheckFailed { node_uri, .. }
            | NodeEvent::RequestSucceeded { node_uri, .. }
            | NodeEvent::RequestFailed { node_uri, .. } => node_uri,
        }
    }
}
