//! `SimResponse`: the result of one proxy attempt.

use crate::error::ProxyError;
use bytes::Bytes;
use std::time::{Duration, Instant};

/// Result of one proxy attempt against a backend.
#[derive(Debug, Clone)]
pub struct SimResponse {
    pub payload: Bytes,
    pub status_code: u16,
    pub error: Option<ProxyError>,
    pub node_uri: String,
    /// How long the attempt took (0 for responses that never reached a node).
    pub sim_duration: Duration,
    /// When the attempt was made.
    pub sim_at: Instant,
}

impl SimResponse {
    /// A successful proxy attempt.
    pub fn ok(payload: Bytes, node_uri: String) -> Self {
        Self {
            payload,
            status_code: 200,
            error: None,
            node_uri,
            sim_duration: Duration::ZERO,
            sim_at: Instant::now(),
        }
    }

    /// A successful proxy attempt with explicit timing, as produced by a
    /// worker after measuring the outbound call.
    pub fn success(payload: Bytes, status_code: u16, node_uri: String, sim_duration: Duration, sim_at: Instant) -> Self {
        Self {
            payload,
            status_code,
            error: None,
            node_uri,
            sim_duration,
            sim_at,
        }
    }

    /// A failed attempt, carrying the structured error and (when available)
    /// the backend's raw response body so it can be forwarded to the client.
    pub fn failure(error: ProxyError, node_uri: String, sim_duration: Duration) -> Self {
        let (status_code, payload) = match &error {
            ProxyError::ProxyStatusError { status, body, .. } => (*status, body.clone()),
            _ => (0, Bytes::new()),
        };
        Self {
            payload,
            status_code,
            error: Some(error),
            node_uri,
            sim_duration,
            sim_at: Instant::now(),
        }
    }

    /// A terminal failure that never touched a node (e.g. `QueueFull`,
    /// `RequestTimeout`).
    pub fn terminal(error: ProxyError) -> Self {
        Self {
            payload: Bytes::new(),
            status_code: 0,
            error: Some(error),
            node_uri: String::new(),
            sim_duration: Duration::ZERO,
            sim_at: Instant::now(),
        }
    }

    /// Whether re-enqueuing the originating request might succeed.
    pub fn should_retry(&self) -> bool {
        self.error.as_ref().is_some_and(ProxyError::is_retryable)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
