//! `SimRequest`: one client call in flight.

use crate::response::SimResponse;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

struct Inner {
    id: String,
    payload: Bytes,
    is_high_prio: bool,
    is_fast_track: bool,
    created_at: Instant,
    tries: AtomicU32,
    cancelled: AtomicBool,
    cancel_token: CancellationToken,
    /// When the ingress's own context budget runs out, if it supplied one.
    /// Combined with `ProxyRequestTimeout` by the worker to derive the
    /// outbound deadline: `min(ctx deadline, timeout)`.
    ctx_deadline: Option<Instant>,
    response: Mutex<Option<oneshot::Sender<SimResponse>>>,
}

/// A single client call in flight.
///
/// Cheap to clone: cloning shares the same underlying slot, counters, and
/// cancellation flag, so the ingress side can hold on to a handle after
/// pushing the request into the queue. The response channel is single-shot
/// — only the first call to [`SimRequest::send_response`] is delivered.
#[derive(Clone)]
pub struct SimRequest(Arc<Inner>);

impl std::fmt::Debug for SimRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimRequest")
            .field("id", &self.0.id)
            .field("is_high_prio", &self.0.is_high_prio)
            .field("is_fast_track", &self.0.is_fast_track)
            .field("tries", &self.tries())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl SimRequest {
    /// Creates a new request and its single-shot response receiver.
    ///
    /// `cancel_token` is the per-request cancellation handle propagated by
    /// the ingress (e.g. tied to the inbound HTTP connection); pass
    /// [`CancellationToken::new`] if the caller has no upstream token to
    /// link against.
    pub fn new(
        id: impl Into<String>,
        payload: Bytes,
        is_high_prio: bool,
        is_fast_track: bool,
        cancel_token: CancellationToken,
    ) -> (Self, oneshot::Receiver<SimResponse>) {
        Self::with_deadline(id, payload, is_high_prio, is_fast_track, cancel_token, None)
    }

    /// Like [`SimRequest::new`], additionally recording the remaining
    /// budget on the ingress's own context, if any. A worker combines this
    /// with `ProxyRequestTimeout` when bounding the outbound call.
    pub fn with_deadline(
        id: impl Into<String>,
        payload: Bytes,
        is_high_prio: bool,
        is_fast_track: bool,
        cancel_token: CancellationToken,
        ctx_remaining: Option<Duration>,
    ) -> (Self, oneshot::Receiver<SimResponse>) {
        let (tx, rx) = oneshot::channel();
        let now = Instant::now();
        let inner = Inner {
            id: id.into(),
            payload,
            is_high_prio,
            is_fast_track,
            created_at: now,
            tries: AtomicU32::new(0),
            cancelled: AtomicBool::new(false),
            cancel_token,
            ctx_deadline: ctx_remaining.map(|d| now + d),
            response: Mutex::new(Some(tx)),
        };
        (Self(Arc::new(inner)), rx)
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn payload(&self) -> &Bytes {
        &self.0.payload
    }

    pub fn is_high_prio(&self) -> bool {
        self.0.is_high_prio
    }

    pub fn is_fast_track(&self) -> bool {
        self.0.is_fast_track
    }

    pub fn created_at(&self) -> Instant {
        self.0.created_at
    }

    pub fn age(&self) -> std::time::Duration {
        self.0.created_at.elapsed()
    }

    /// The per-request cancellation handle, propagated into the outbound
    /// proxy call so a client disconnect can abort it.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.0.cancel_token
    }

    /// Bounds `proxy_timeout` by whatever remains of the ingress's own
    /// context deadline, implementing the `min(ctx deadline, timeout)` rule.
    pub fn outbound_deadline(&self, proxy_timeout: Duration) -> Duration {
        match self.0.ctx_deadline {
            Some(deadline) => proxy_timeout.min(deadline.saturating_duration_since(Instant::now())),
            None => proxy_timeout,
        }
    }

    /// Current attempt count.
    pub fn tries(&self) -> u32 {
        self.0.tries.load(Ordering::Relaxed)
    }

    /// Increments and returns the new attempt count. Called once per
    /// dispatch attempt, before the outbound proxy call.
    pub fn increment_tries(&self) -> u32 {
        self.0.tries.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Marks the request cancelled. Workers that pop a cancelled request
    /// drop it without contacting any backend and without responding.
    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::Relaxed);
        self.0.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::Relaxed)
    }

    /// Attempts a non-blocking delivery of the response.
    ///
    /// Returns `true` if this call filled the slot, `false` if the slot was
    /// already filled by an earlier call or no receiver remains. Never
    /// blocks the calling worker.
    pub fn send_response(&self, response: SimResponse) -> bool {
        let sender = self.0.response.lock().take();
        match sender {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }
}
