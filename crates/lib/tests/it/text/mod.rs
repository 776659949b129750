//! Text integration tests
//!
//! Character editing, minimal-diff updates, cursors and marks, each
//! checked against concurrent edits from a second replica.

mod cursors;
mod editing;
mod marks;
