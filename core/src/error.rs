use thiserror::Error;

/// Error type for decompression calculations.
///
/// `InvalidInput` and `NumericDivergence` abort a calculation entirely.
/// `NoUsableGas` and `UnreachableAscent` are planning failures the caller can
/// fix by changing the gas set; the top-level calculation reports them as
/// issues instead of failing.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
#[uniffi(flat_error)]
pub enum DecoError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("no usable gas at {depth:.1} m")]
    NoUsableGas { depth: f64 },

    #[error("unreachable ascent from {depth:.1} m")]
    UnreachableAscent { depth: f64 },

    #[error("numeric divergence: {message}")]
    NumericDivergence { message: String },
}

impl DecoError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DecoError::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn divergence(message: impl Into<String>) -> Self {
        DecoError::NumericDivergence {
            message: message.into(),
        }
    }

    /// True for failures the caller can resolve by re-planning with other gases.
    pub fn is_planning_failure(&self) -> bool {
        matches!(
            self,
            DecoError::NoUsableGas { .. } | DecoError::UnreachableAscent { .. }
        )
    }
}
