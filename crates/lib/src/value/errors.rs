//! Error types for value conversions.

use thiserror::Error;

/// Errors raised while converting values in or out of the document model.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An integer could not be represented exactly as an `f64`.
    ///
    /// This is informational: the caller asked for a lossy conversion and
    /// the stored value is unaffected.
    #[error("Integer {value} exceeds the exactly representable f64 range")]
    PrecisionLoss {
        /// The integer that was converted
        value: String,
    },

    /// JSON input could not be mapped onto document values.
    #[error("Unsupported JSON input: {reason}")]
    UnsupportedJson {
        /// What was wrong with the input
        reason: String,
    },
}

impl ValueError {
    /// Check if this error reports a lossy numeric conversion.
    pub fn is_precision_loss(&self) -> bool {
        matches!(self, ValueError::PrecisionLoss { .. })
    }

    /// Check if this error reports unusable JSON input.
    pub fn is_unsupported_json(&self) -> bool {
        matches!(self, ValueError::UnsupportedJson { .. })
    }
}

impl From<ValueError> for crate::Error {
    fn from(err: ValueError) -> Self {
        crate::Error::Value(err)
    }
}
