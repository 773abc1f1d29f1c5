//! Configuration for a [`crate::NodePool`].

use std::time::Duration;

/// Pool-wide configuration: the health-check cadence and the retry cap
/// applied to every request regardless of which node it lands on.
#[derive(Clone)]
pub struct PoolConfig {
    pub health_check_interval: Duration,
    pub max_retries: u32,
}

impl PoolConfig {
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }
}

/// Builder for [`PoolConfig`].
pub struct PoolConfigBuilder {
    health_check_interval: Duration,
    max_retries: u32,
}

impl PoolConfigBuilder {
    pub fn new() -> Self {
        Self {
            health_check_interval: Duration::from_secs(10),
            max_retries: 2,
        }
    }

    /// How often the background loop probes every registered node. Default: 10s.
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Maximum number of re-dispatch attempts after the first, before a
    /// failing request's last error is delivered to the caller. Default: 2.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn build(self) -> PoolConfig {
        PoolConfig {
            health_check_interval: self.health_check_interval,
            max_retries: self.max_retries,
        }
    }
}

impl Default for PoolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
