//! The three-class priority queue and its interleaving scheduler.

use crate::config::PrioQueueConfig;
use crate::events::QueueEvent;
use parking_lot::Mutex;
use plb_core::error::ProxyError;
use plb_core::SimRequest;
use std::collections::VecDeque;
use std::time::Instant;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};

#[cfg(feature = "metrics")]
use metrics::gauge;

struct State {
    fast_track: VecDeque<SimRequest>,
    high_prio: VecDeque<SimRequest>,
    low_prio: VecDeque<SimRequest>,
    closed: bool,
    /// Count of completed pops, used to derive the scheduler phase.
    n: u64,
}

/// Three-class FIFO queue with a configurable interleaving policy between
/// the fast-track and high-prio classes. Low-prio is strictly residual.
///
/// A single [`parking_lot::Mutex`] guards all three sub-queues plus the
/// `closed` flag and the pop counter; a [`tokio::sync::Notify`] wakes one
/// waiter per push and broadcasts on close, playing the role of the
/// condition variable this design is built around.
pub struct PrioQueue {
    state: Mutex<State>,
    notify: Notify,
    config: PrioQueueConfig,
}

impl PrioQueue {
    pub fn new(config: PrioQueueConfig) -> Self {
        Self {
            state: Mutex::new(State {
                fast_track: VecDeque::new(),
                high_prio: VecDeque::new(),
                low_prio: VecDeque::new(),
                closed: false,
                n: 0,
            }),
            notify: Notify::new(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Pushes a request onto the sub-queue selected by its flags
    /// (fast-track > high-prio > low-prio). Fails with
    /// [`ProxyError::QueueFull`] if that sub-queue is already at capacity.
    /// A no-op once the queue is closed.
    pub fn push(&self, req: SimRequest) -> Result<(), ProxyError> {
        let (class, len) = {
            let mut state = self.state.lock();
            if state.closed {
                return Ok(());
            }

            let (queue, max, class) = if req.is_fast_track() {
                (&mut state.fast_track, self.config.max_fast_track, "fast_track")
            } else if req.is_high_prio() {
                (&mut state.high_prio, self.config.max_high_prio, "high_prio")
            } else {
                (&mut state.low_prio, self.config.max_low_prio, "low_prio")
            };

            if max > 0 && queue.len() >= max {
                self.config.event_listeners.emit(&QueueEvent::Rejected {
                    queue_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    class,
                    capacity: max,
                });
                return Err(ProxyError::QueueFull { class, capacity: max });
            }

            queue.push_back(req);
            (class, queue.len())
        };

        self.config.event_listeners.emit(&QueueEvent::Pushed {
            queue_name: self.config.name.clone(),
            timestamp: Instant::now(),
            class,
            len,
        });

        #[cfg(feature = "metrics")]
        gauge!("plb_queue_depth", "queue" => self.config.name.clone(), "class" => class)
            .set(len as f64);

        self.notify.notify_one();
        Ok(())
    }

    /// Blocks until a request is available or the queue is closed and
    /// drained, in which case it returns `None`.
    pub async fn pop(&self) -> Option<SimRequest> {
        loop {
            let notified;
            {
                let mut state = self.state.lock();
                if let Some((class, req)) = self.try_pop_locked(&mut state) {
                    drop(state);
                    self.config.event_listeners.emit(&QueueEvent::Popped {
                        queue_name: self.config.name.clone(),
                        timestamp: Instant::now(),
                        class,
                    });
                    return Some(req);
                }
                if state.closed {
                    return None;
                }
                notified = self.notify.notified();
            }
            notified.await;
        }
    }

    /// Interleaving decision (see DESIGN.md for the worked-example
    /// derivation): a "fast cycle" has length `1 + high_prio_per_fast_track`;
    /// every phase except the last prefers fast-track, the last phase
    /// prefers high-prio. `fast_track_drain_first`
    /// bypasses interleaving entirely.
    fn try_pop_locked(&self, state: &mut State) -> Option<(&'static str, SimRequest)> {
        let picked = if self.config.fast_track_drain_first {
            if let Some(r) = state.fast_track.pop_front() {
                Some(("fast_track", r))
            } else if let Some(r) = state.high_prio.pop_front() {
                Some(("high_prio", r))
            } else {
                state.low_prio.pop_front().map(|r| ("low_prio", r))
            }
        } else {
            let cycle = 1 + self.config.high_prio_per_fast_track as u64;
            let phase = state.n % cycle;
            let high_preferred = phase == cycle - 1;

            if high_preferred {
                if let Some(r) = state.high_prio.pop_front() {
                    Some(("high_prio", r))
                } else if let Some(r) = state.fast_track.pop_front() {
                    Some(("fast_track", r))
                } else {
                    state.low_prio.pop_front().map(|r| ("low_prio", r))
                }
            } else if let Some(r) = state.fast_track.pop_front() {
                Some(("fast_track", r))
            } else if let Some(r) = state.high_prio.pop_front() {
                Some(("high_prio", r))
            } else {
                state.low_prio.pop_front().map(|r| ("low_prio", r))
            }
        };

        if picked.is_some() {
            state.n = state.n.wrapping_add(1);
        }
        picked
    }

    /// Marks the queue closed and wakes every waiter; `push` becomes a
    /// no-op and pending pops will still drain existing items before
    /// observing `None`. Returns once the queue is fully drained.
    pub async fn close_and_wait(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
        }
        self.config.event_listeners.emit(&QueueEvent::Closed {
            queue_name: self.config.name.clone(),
            timestamp: Instant::now(),
        });
        self.notify.notify_waiters();

        while self.num_requests() > 0 {
            self.notify.notify_waiters();
            sleep(Duration::from_millis(10)).await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn num_requests(&self) -> usize {
        let state = self.state.lock();
        state.fast_track.len() + state.high_prio.len() + state.low_prio.len()
    }

    pub fn class_lengths(&self) -> (usize, usize, usize) {
        let state = self.state.lock();
        (
            state.fast_track.len(),
            state.high_prio.len(),
            state.low_prio.len(),
        )
    }
}

impl std::fmt::Display for PrioQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (fast, high, low) = self.class_lengths();
        write!(
            f,
            "PrioQueue({}: fast={} high={} low={} closed={})",
            self.config.name,
            fast,
            high,
            low,
            self.is_closed()
        )
    }
}
