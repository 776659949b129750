//! Error types for document-level history and persistence.

use thiserror::Error;

/// Errors raised while merging, forking or loading documents.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A change depends on, or the caller named, a change that is not
    /// available.
    #[error("Unknown dependency: {hash}")]
    UnknownDependency {
        /// Hex hash of the missing change
        hash: String,
    },

    /// A saved document failed its integrity checks.
    #[error("Corrupt document: {reason}")]
    CorruptDocument {
        /// What check failed
        reason: String,
    },

    /// A saved document uses a format version this build cannot read.
    #[error("Unsupported document format version {version}")]
    UnsupportedVersion {
        /// Version found in the snapshot
        version: u32,
    },
}

impl DocumentError {
    /// Check if this error is a missing dependency.
    pub fn is_unknown_dependency(&self) -> bool {
        matches!(self, DocumentError::UnknownDependency { .. })
    }

    /// Check if this error is a failed integrity check.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            DocumentError::CorruptDocument { .. } | DocumentError::UnsupportedVersion { .. }
        )
    }
}

impl From<DocumentError> for crate::Error {
    fn from(err: DocumentError) -> Self {
        crate::Error::Document(err)
    }
}
