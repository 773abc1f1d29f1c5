//! Configuration for [`crate::PrioQueue`].

use crate::events::QueueEvent;
use plb_core::events::{EventListeners, FnListener};

/// Configuration for a [`crate::PrioQueue`].
#[derive(Clone)]
pub struct PrioQueueConfig {
    pub(crate) name: String,
    pub(crate) max_fast_track: usize,
    pub(crate) max_high_prio: usize,
    pub(crate) max_low_prio: usize,
    pub(crate) high_prio_per_fast_track: u32,
    pub(crate) fast_track_drain_first: bool,
    pub(crate) event_listeners: EventListeners<QueueEvent>,
}

impl PrioQueueConfig {
    pub fn builder() -> PrioQueueConfigBuilder {
        PrioQueueConfigBuilder::new()
    }
}

/// Builder for [`PrioQueueConfig`].
pub struct PrioQueueConfigBuilder {
    name: String,
    max_fast_track: usize,
    max_high_prio: usize,
    max_low_prio: usize,
    high_prio_per_fast_track: u32,
    fast_track_drain_first: bool,
    event_listeners: EventListeners<QueueEvent>,
}

impl PrioQueueConfigBuilder {
    pub fn new() -> Self {
        Self {
            name: "prio_queue".to_string(),
            max_fast_track: 0,
            max_high_prio: 0,
            max_low_prio: 0,
            high_prio_per_fast_track: 1,
            fast_track_drain_first: false,
            event_listeners: EventListeners::new(),
        }
    }

    /// Name used in diagnostics and emitted events. Default: "prio_queue".
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Capacity of the fast-track sub-queue. 0 means unbounded. Default: 0.
    pub fn max_fast_track(mut self, max: usize) -> Self {
        self.max_fast_track = max;
        self
    }

    /// Capacity of the high-prio sub-queue. 0 means unbounded. Default: 0.
    pub fn max_high_prio(mut self, max: usize) -> Self {
        self.max_high_prio = max;
        self
    }

    /// Capacity of the low-prio sub-queue. 0 means unbounded. Default: 0.
    pub fn max_low_prio(mut self, max: usize) -> Self {
        self.max_low_prio = max;
        self
    }

    /// Interleaving ratio between the fast-track and high-prio classes.
    /// Default: 1 (alternate one-for-one).
    pub fn high_prio_per_fast_track(mut self, ratio: u32) -> Self {
        self.high_prio_per_fast_track = ratio;
        self
    }

    /// If true, fast-track is fully drained before high-prio is considered
    /// at all, bypassing interleaving. Default: false.
    pub fn fast_track_drain_first(mut self, drain_first: bool) -> Self {
        self.fast_track_drain_first = drain_first;
        self
    }

    /// Registers a callback invoked whenever a request is pushed.
    pub fn on_push<F>(mut self, f: F) -> Self
    where
        F: Fn(&'static str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let QueueEvent::Pushed { class, len, .. } = event {
                f(class, *len);
            }
        }));
        self
    }

    /// Registers a callback invoked whenever a push is rejected because its
    /// sub-queue is full.
    pub fn on_reject<F>(mut self, f: F) -> Self
    where
        F: Fn(&'static str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let QueueEvent::Rejected {
                class, capacity, ..
            } = event
            {
                f(class, *capacity);
            }
        }));
        self
    }

    pub fn build(self) -> PrioQueueConfig {
        PrioQueueConfig {
            name: self.name,
            max_fast_track: self.max_fast_track,
            max_high_prio: self.max_high_prio,
            max_low_prio: self.max_low_prio,
            high_prio_per_fast_track: self.high_prio_per_fast_track,
            fast_track_drain_first: self.fast_track_drain_first,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for PrioQueueConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
