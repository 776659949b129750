//!
//! Accord: a JSON-like document that many replicas can edit concurrently
//! and merge without coordination.
//!
//! ## Core Concepts
//!
//! Accord is built around several key concepts:
//!
//! * **Documents (`document::Document`)**: A tree of maps, lists and text rooted at [`ROOT`], plus the history that produced it.
//! * **Transactions (`transaction::Transaction`)**: Scoped builders for local edits. Reads inside a transaction see its own writes; `commit` turns them into a change.
//! * **Changes (`change::Change`)**: Immutable, content-addressed batches of ops by one actor. Each names the heads it was built on, forming a Merkle-DAG.
//! * **Object store (`store::OpSet`)**: The materialized state, where concurrent writes are resolved by op id. Sequences use a replicated growable array with tombstones.
//! * **Text (`text`)**: Character-level editing, minimal-diff updates, stable cursors and formatting marks.
//! * **Sync (`sync`)**: A bloom-filter based protocol that brings two replicas to the same heads in a few round trips.
//!
//! ```
//! use accord::{Document, ObjType, ReadDoc, ROOT};
//!
//! let mut alice = Document::new();
//! let mut tx = alice.transaction();
//! let todo = tx.put_object(&ROOT, "todo", ObjType::List).unwrap();
//! tx.push(&todo, "buy milk").unwrap();
//! tx.commit().unwrap();
//!
//! let mut bob = alice.fork();
//! bob.transact(|tx| tx.push(&todo, "walk dog")).unwrap();
//! alice.transact(|tx| tx.put(&ROOT, "owner", "alice")).unwrap();
//!
//! alice.merge(&bob).unwrap();
//! assert_eq!(alice.length(&todo).unwrap(), 2);
//! assert!(alice.get(&ROOT, "owner").unwrap().unwrap() == "alice");
//! ```

pub mod change;
pub mod clock;
pub mod config;
pub mod constants;
pub mod document;
pub mod graph;
pub mod store;
pub mod sync;
pub mod text;
pub mod transaction;
pub mod types;
pub mod value;

pub use change::{Change, ChangeBuilder, ExpandMark, Op, OpAction};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use config::{DocumentConfig, SyncConfig};
pub use document::{Document, LoadMode, ReadDoc};
pub use sync::{Message as SyncMessage, SyncPhase, SyncReport, SyncState, sync_documents};
pub use text::Mark;
pub use transaction::{CommitOptions, Transaction};
pub use types::{ActorId, ChangeHash, Cursor, ObjId, OpId, Prop};
pub use value::{Composite, ObjType, ScalarValue, Value};

/// The root map every document starts with.
pub const ROOT: ObjId = ObjId::Root;

/// Result type used throughout the Accord library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Accord library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed identifiers from the types module
    #[error(transparent)]
    Id(types::IdError),

    /// Value conversion errors from the value module
    #[error(transparent)]
    Value(value::ValueError),

    /// Change encoding and integrity errors from the change module
    #[error(transparent)]
    Change(change::ChangeError),

    /// Object store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// History and persistence errors from the document module
    #[error(transparent)]
    Document(document::DocumentError),

    /// Protocol errors from the sync module
    #[error(transparent)]
    Sync(sync::SyncError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Id(_) => "types",
            Error::Value(_) => "value",
            Error::Change(_) => "change",
            Error::Store(_) => "store",
            Error::Document(_) => "document",
            Error::Sync(_) => "sync",
        }
    }

    /// Check if this error is a write against the wrong kind of object or
    /// value.
    pub fn is_type_mismatch(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_type_mismatch(),
            _ => false,
        }
    }

    /// Check if this error is an index past the end of a sequence.
    pub fn is_index_out_of_range(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_index_out_of_range(),
            _ => false,
        }
    }

    /// Check if this error indicates an object was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a malformed actor id.
    pub fn is_invalid_actor(&self) -> bool {
        match self {
            Error::Id(id_err) => id_err.is_invalid_actor(),
            _ => false,
        }
    }

    /// Check if this error is a change whose hash does not match its
    /// contents.
    pub fn is_corrupt_change(&self) -> bool {
        match self {
            Error::Change(change_err) => change_err.is_corrupt(),
            _ => false,
        }
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Change(change_err) => change_err.is_corrupt() || change_err.is_decode_error(),
            Error::Store(store_err) => store_err.is_integrity_error(),
            Error::Document(doc_err) => doc_err.is_corrupt(),
            _ => false,
        }
    }

    /// Check if this error is a missing change dependency.
    pub fn is_unknown_dependency(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_unknown_dependency(),
            _ => false,
        }
    }

    /// Check if this error is a malformed sync message or state.
    pub fn is_protocol_error(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_protocol_error(),
            _ => false,
        }
    }

    /// Check if this error reports a number that does not fit a float.
    pub fn is_precision_loss(&self) -> bool {
        match self {
            Error::Value(value_err) => value_err.is_precision_loss(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Whether the failed operation produced no usable result.
    ///
    /// Precision loss is informational: the lossy value is still usable.
    pub fn is_fatal(&self) -> bool {
        !self.is_precision_loss()
    }
}
