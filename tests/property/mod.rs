//! Property-based tests for the priority queue and retry routing.
//!
//! Run with: cargo test --test property_tests

pub mod queue;
pub mod retry;
