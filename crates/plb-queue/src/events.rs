//! Events emitted by [`crate::PrioQueue`].

use plb_core::events::DispatchEvent;
use std::time::Instant;

/// An event emitted by a [`crate::PrioQueue`] instance.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    Pushed {
        queue_name: String,
        timestamp: Instant,
        class: &'static str,
        len: usize,
    },
    Rejected {
        queue_name: String,
        timestamp: Instant,
        class: &'static str,
        capacity: usize,
    },
    Popped {
        queue_name: String,
        timestamp: Instant,
        class: &'static str,
    },
    Closed {
        queue_name: String,
        timestamp: Instant,
    },
}

impl DispatchEvent for QueueEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QueueEvent::Pushed { .. } => "push",
            QueueEvent::Rejected { .. } => "reject",
            QueueEvent::Popped { .. } => "pop",
            QueueEvent::Closed { .. } => "close",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            QueueEvent::Pushed { timestamp, .. }
            | QueueEvent::Rejected { timestamp, .. }
            | QueueEvent::Popped { timestamp, .. }
            | QueueEvent::Closed { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            QueueEvent::Pushed { queue_name, .. }
            | QueueEvent::Rejected { queue_name, .. }
            | QueueEvent::Popped { queue_name, .. }
            | QueueEvent::Closed { queue_name, .. } => queue_name,
        }
    }
}
