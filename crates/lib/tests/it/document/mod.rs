//! Document integration tests
//!
//! Replicas editing concurrently, merging in different orders, and the
//! history queries used to drive that.

mod history;
mod merging;
