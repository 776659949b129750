//! Sync protocol integration tests
//!
//! Message-level exchanges between two replicas, persisted sync state and
//! the in-memory driver.

mod protocol;
