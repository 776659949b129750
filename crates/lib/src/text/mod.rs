//! Character-level text editing on top of the sequence CRDT.
//!
//! Text objects store one element per Unicode code point. This module
//! holds the pieces specific to text: the diff used by
//! [`Transaction::update_text`](crate::Transaction::update_text), cursor
//! binding and mark anchoring/resolution.

pub(crate) mod cursor;
pub mod diff;
pub mod marks;

pub use marks::Mark;
