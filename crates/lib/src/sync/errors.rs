//! Error types for the sync protocol.

use thiserror::Error;

/// Errors raised while encoding, decoding or processing sync messages.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A message or saved sync state could not be decoded.
    #[error("Sync protocol error: {reason}")]
    ProtocolError {
        /// What was wrong with the input
        reason: String,
    },
}

impl SyncError {
    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        SyncError::ProtocolError {
            reason: reason.into(),
        }
    }

    /// Check if this error is a malformed message or state.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, SyncError::ProtocolError { .. })
    }
}

impl From<SyncError> for crate::Error {
    fn from(err: SyncError) -> Self {
        crate::Error::Sync(err)
    }
}
