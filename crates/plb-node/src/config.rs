//! Configuration for a [`crate::Node`].

use bytes::Bytes;
use std::time::Duration;

/// The default JSON-RPC health probe body (`net_version`, Ethereum
/// JSON-RPC). Configurable so a non-Ethereum backend can supply its own
/// probe payload.
pub fn default_health_probe_body() -> Bytes {
    Bytes::from_static(br#"{"jsonrpc":"2.0","method":"net_version","params":[],"id":123}"#)
}

/// Configuration for one backend node.
#[derive(Clone)]
pub struct NodeConfig {
    pub uri: String,
    pub num_workers: usize,
    /// Max age a request may sit in the queue before a worker discards it
    /// unexecuted.
    pub request_timeout: Duration,
    /// Max duration of one outbound backend call.
    pub proxy_request_timeout: Duration,
    /// Timeout for the health probe. Default: 5s, per spec.
    pub health_check_timeout: Duration,
    pub health_probe_body: Bytes,
}

impl NodeConfig {
    pub fn builder(uri: impl Into<String>) -> NodeConfigBuilder {
        NodeConfigBuilder::new(uri)
    }
}

/// Builder for [`NodeConfig`].
pub struct NodeConfigBuilder {
    uri: String,
    num_workers: usize,
    request_timeout: Duration,
    proxy_request_timeout: Duration,
    health_check_timeout: Duration,
    health_probe_body: Bytes,
}

impl NodeConfigBuilder {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            num_workers: 1,
            request_timeout: Duration::from_secs(30),
            proxy_request_timeout: Duration::from_secs(10),
            health_check_timeout: Duration::from_secs(5),
            health_probe_body: default_health_probe_body(),
        }
    }

    /// Number of worker tasks this node runs. Must be at least 1. Default: 1.
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n.max(1);
        self
    }

    /// Default: 30s.
    pub fn request_timeout(mut self, d: Duration) -> Self {
        self.request_timeout = d;
        self
    }

    /// Default: 10s.
    pub fn proxy_request_timeout(mut self, d: Duration) -> Self {
        self.proxy_request_timeout = d;
        self
    }

    /// Default: 5s.
    pub fn health_check_timeout(mut self, d: Duration) -> Self {
        self.health_check_timeout = d;
        self
    }

    /// Override the health probe payload. Default: the `net_version`
    /// JSON-RPC body.
    pub fn health_probe_body(mut self, body: Bytes) -> Self {
        self.health_probe_body = body;
        self
    }

    pub fn build(self) -> NodeConfig {
        NodeConfig {
            uri: self.uri,
            num_workers: self.num_workers,
            request_timeout: self.request_timeout,
            proxy_request_timeout: self.proxy_request_timeout,
            health_check_timeout: self.health_check_timeout,
            health_probe_body: self.health_probe_body,
        }
    }
}
