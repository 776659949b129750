//! Error types for identifier parsing and validation.

use thiserror::Error;

/// Errors raised while constructing or parsing identifiers.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// An actor id had the wrong length or was not valid hex.
    #[error("Invalid actor id: {reason}")]
    InvalidActor {
        /// Why the actor id was rejected
        reason: String,
    },

    /// An object or op id string could not be parsed.
    #[error("Invalid object id: {value}")]
    InvalidObjectId {
        /// The rejected input
        value: String,
    },

    /// A change hash string was not 64 hex characters.
    #[error("Invalid change hash: {value}")]
    InvalidHash {
        /// The rejected input
        value: String,
    },
}

impl IdError {
    /// Check if this error is an invalid actor id.
    pub fn is_invalid_actor(&self) -> bool {
        matches!(self, IdError::InvalidActor { .. })
    }

    /// Check if this error is a malformed object or op id.
    pub fn is_invalid_object_id(&self) -> bool {
        matches!(self, IdError::InvalidObjectId { .. })
    }

    /// Check if this error is a malformed change hash.
    pub fn is_invalid_hash(&self) -> bool {
        matches!(self, IdError::InvalidHash { .. })
    }
}

impl From<IdError> for crate::Error {
    fn from(err: IdError) -> Self {
        crate::Error::Id(err)
    }
}
