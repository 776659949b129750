//! Error types for object store reads and writes.

use thiserror::Error;

/// Errors raised by the object store.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The object or slot has a different kind than the operation needs.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the operation needed
        expected: String,
        /// What was actually there
        found: String,
    },

    /// A sequence index lies beyond the current length.
    #[error("Index {index} out of range for length {length}")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// The visible length of the sequence
        length: usize,
    },

    /// No object with this id exists in the document.
    #[error("Object not found: {obj}")]
    ObjectNotFound {
        /// The requested object id
        obj: String,
    },

    /// An op refers to a sequence element that does not exist.
    #[error("Element {elem} not found in {obj}")]
    MissingElement {
        /// The sequence object
        obj: String,
        /// The element id
        elem: String,
    },

    /// An op targets an object that has not been created.
    #[error("Op {op} targets missing object {obj}")]
    MissingObject {
        /// The op being applied
        op: String,
        /// The absent object
        obj: String,
    },
}

impl StoreError {
    /// Check if this error is a type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, StoreError::TypeMismatch { .. })
    }

    /// Check if this error is an out-of-range index.
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self, StoreError::IndexOutOfRange { .. })
    }

    /// Check if this error is an unknown object or element.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ObjectNotFound { .. }
                | StoreError::MissingElement { .. }
                | StoreError::MissingObject { .. }
        )
    }

    /// Check if this error came from applying an inconsistent op.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            StoreError::MissingElement { .. } | StoreError::MissingObject { .. }
        )
    }

    pub(crate) fn type_mismatch(expected: impl Into<String>, found: impl ToString) -> Self {
        StoreError::TypeMismatch {
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
