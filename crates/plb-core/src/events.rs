//! Event system for the dispatch path.
//!
//! Adapted from the resilience-pattern event system: a small trait-object
//! based pub/sub that lets queue, node, and pool crates emit structured
//! events without depending on `tracing` or `metrics` directly.

#[cfg(feature = "tracing")]
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Trait for events emitted anywhere in the dispatch path.
pub trait DispatchEvent: Send + Sync + fmt::Debug {
    /// Returns the type of event (e.g., "push", "pop", "health_change").
    fn event_type(&self) -> &'static str;

    /// Returns when this event occurred.
    fn timestamp(&self) -> Instant;

    /// Returns the name of the component instance that emitted this event
    /// (a queue name, a node URI, ...).
    fn source(&self) -> &str;
}

/// Trait for listening to dispatch events.
pub trait EventListener<E: DispatchEvent>: Send + Sync {
    fn on_event(&self, event: &E);
}

/// Type alias for boxed event listeners.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// A collection of event listeners.
#[derive(Clone)]
pub struct EventListeners<E: DispatchEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: DispatchEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Emits an event to all registered listeners.
    ///
    /// A panicking listener is caught so it cannot take down a worker task;
    /// the remaining listeners still run. With the `tracing` feature the
    /// panic is logged as a warning; with `metrics` a counter is bumped.
    pub fn emit(&self, event: &E) {
        for (index, listener) in self.listeners.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));

            if let Err(_panic_payload) = result {
                #[cfg(feature = "tracing")]
                log_listener_panic(index, event, _panic_payload.as_ref());

                #[cfg(feature = "metrics")]
                record_listener_panic_metric(event);

                #[cfg(not(feature = "tracing"))]
                let _ = index;

                #[cfg(not(any(feature = "tracing", feature = "metrics")))]
                let _ = _panic_payload;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: DispatchEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A simple function-based event listener.
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<E>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: DispatchEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}

#[cfg(feature = "tracing")]
fn log_listener_panic<E: DispatchEvent>(
    index: usize,
    event: &E,
    panic_payload: &(dyn Any + Send),
) {
    let panic_message = panic_payload
        .downcast_ref::<&'static str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic_payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    tracing::warn!(
        listener_index = index,
        source = event.source(),
        event_type = event.event_type(),
        panic_message = %panic_message,
        "dispatch event listener panicked"
    );
}

#[cfg(feature = "metrics")]
fn record_listener_panic_metric<E: DispatchEvent>(event: &E) {
    let source_label = event.source().to_string();
    let event_type_label = event.event_type().to_string();

    metrics::counter!(
        "plb_event_listener_panics_total",
        "source" => source_label,
        "event_type" => event_type_label
    )
    .increment(1);
}
