//! Persistence integration tests
//!
//! Snapshots, incremental saves and files on disk.

mod save_load;
