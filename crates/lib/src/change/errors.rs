//! Error types for change encoding and validation.

use thiserror::Error;

use crate::types::ActorId;

/// Errors raised while encoding, decoding or admitting changes.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChangeError {
    /// The hash stored in an encoded change does not match its body.
    #[error("Corrupt change: declared hash {declared}, computed {computed}")]
    CorruptChange {
        /// Hash carried in the header
        declared: String,
        /// Hash of the body bytes
        computed: String,
    },

    /// Bytes could not be decoded as a change.
    #[error("Failed to decode change: {reason}")]
    Decode {
        /// Description of the failure
        reason: String,
    },

    /// A change could not be serialized.
    #[error("Failed to encode change: {reason}")]
    Encode {
        /// Description of the failure
        reason: String,
    },

    /// Two different changes claim the same actor and sequence number.
    #[error("Actor {actor} already has a different change with seq {seq}")]
    DuplicateSeq {
        /// Actor of the conflicting change
        actor: ActorId,
        /// The reused sequence number
        seq: u64,
    },
}

impl ChangeError {
    /// Check if this error is a hash mismatch.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ChangeError::CorruptChange { .. })
    }

    /// Check if this error is a decoding failure.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, ChangeError::Decode { .. })
    }

    /// Check if this error is a reused sequence number.
    pub fn is_duplicate_seq(&self) -> bool {
        matches!(self, ChangeError::DuplicateSeq { .. })
    }
}

impl From<ChangeError> for crate::Error {
    fn from(err: ChangeError) -> Self {
        crate::Error::Change(err)
    }
}
