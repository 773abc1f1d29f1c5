//! Unified error model for the dispatch path.
//!
//! Mirrors the `shouldRetry` column of the error table in the load balancer
//! design: every variant knows whether re-enqueuing the request is worth
//! attempting, so callers never need to pattern-match to find out.

use bytes::Bytes;
use std::time::Duration;

/// Stage at which a transport-level failure occurred, carried for logging
/// context (creating the request, sending it, or decoding the response).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStage {
    Creating,
    Sending,
    Decoding,
}

impl std::fmt::Display for TransportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportStage::Creating => "creating",
            TransportStage::Sending => "sending",
            TransportStage::Decoding => "decoding",
        };
        f.write_str(s)
    }
}

/// A coarse tag for matching on the kind of failure without inspecting the
/// variant's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyErrorKind {
    QueueFull,
    RequestTimeout,
    ProxyTimeout,
    ProxyTransport,
    ProxyStatusError,
    Cancelled,
}

/// Every way a `SimRequest` can fail to produce a `SimResponse`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProxyError {
    /// The sub-queue selected for this request was already at capacity.
    #[error("{class} sub-queue is full (capacity {capacity})")]
    QueueFull { class: &'static str, capacity: usize },

    /// The request aged past `RequestTimeout` while still sitting in the
    /// queue; a worker discarded it without contacting any backend.
    #[error("request exceeded queue-age timeout after {waited:?}")]
    RequestTimeout { waited: Duration },

    /// The outbound call exceeded `min(ctx deadline, ProxyRequestTimeout)`.
    #[error("proxy call to {node_uri} timed out")]
    ProxyTimeout { node_uri: String },

    /// A connection, DNS, or read/write failure at the named stage.
    #[error("transport error {stage} request to {node_uri}: {message}")]
    ProxyTransport {
        node_uri: String,
        stage: TransportStage,
        message: String,
    },

    /// The backend responded with a status code >= 400. The body is
    /// forwarded verbatim to the caller.
    #[error("backend {node_uri} returned status {status}")]
    ProxyStatusError {
        node_uri: String,
        status: u16,
        body: Bytes,
    },

    /// The request was flagged cancelled before a worker could dispatch it.
    /// No response is sent for this variant; it exists so internal plumbing
    /// can report the drop to logs/metrics.
    #[error("request cancelled before dispatch")]
    Cancelled,
}

impl ProxyError {
    /// The coarse kind, for cheap matching.
    pub fn kind(&self) -> ProxyErrorKind {
        match self {
            ProxyError::QueueFull { .. } => ProxyErrorKind::QueueFull,
            ProxyError::RequestTimeout { .. } => ProxyErrorKind::RequestTimeout,
            ProxyError::ProxyTimeout { .. } => ProxyErrorKind::ProxyTimeout,
            ProxyError::ProxyTransport { .. } => ProxyErrorKind::ProxyTransport,
            ProxyError::ProxyStatusError { .. } => ProxyErrorKind::ProxyStatusError,
            ProxyError::Cancelled => ProxyErrorKind::Cancelled,
        }
    }

    /// Whether re-enqueuing the same request might succeed.
    ///
    /// `QueueFull` and `RequestTimeout` are terminal: the request has
    /// already demonstrated it cannot be served under current load.
    /// `ProxyTimeout` and `ProxyTransport` are potentially transient.
    /// `ProxyStatusError` is retryable only for 5xx; 4xx is forwarded
    /// verbatim since retrying would reproduce the same client error.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProxyError::QueueFull { .. } => false,
            ProxyError::RequestTimeout { .. } => false,
            ProxyError::ProxyTimeout { .. } => true,
            ProxyError::ProxyTransport { .. } => true,
            ProxyError::ProxyStatusError { status, .. } => *status >= 500,
            ProxyError::Cancelled => false,
        }
    }

    pub fn is_queue_full(&self) -> bool {
        self.kind() == ProxyErrorKind::QueueFull
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ProxyErrorKind::Cancelled
    }
}
