//! One backend node: its worker pool, HTTP proxy adapter, and health probe.
//!
//! A [`Node`] owns no knowledge of other nodes or retry policy — that lives
//! one layer up, in `plb-pool`. It only pulls work off a shared
//! [`plb_queue::PrioQueue`], proxies it, and reports its own health.

pub mod config;
pub mod events;
pub mod node;
pub mod proxy;
pub mod stats;

pub use config::{NodeConfig, NodeConfigBuilder};
pub use events::NodeEvent;
pub use node::Node;
pub use proxy::proxy_request;
pub use stats::NodeStats;
