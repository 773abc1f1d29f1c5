//! Core types shared by the prioritized load balancer crates.
//!
//! This crate has no knowledge of queues, nodes, or HTTP — it only defines
//! the unit of work (`SimRequest`), its result (`SimResponse`), the unified
//! error model, and a small event system that the other `plb-*` crates use
//! for observability hooks.

pub mod error;
pub mod events;
pub mod request;
pub mod response;

pub use error::{ProxyError, ProxyErrorKind};
pub use request::SimRequest;
pub use response::SimResponse;
