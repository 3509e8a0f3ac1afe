//! Cross-modal conversion errors.

use super::error_code::{self, CredenceErrorCode};
use crate::models::{Format, HopDiagnostic, RoundTripDiagnostic};

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Preservation thresholds violated. Carries every hop so the caller can
    /// see exactly where entities or relationships were lost.
    #[error("conversion integrity violated: {summary}")]
    ConversionIntegrity {
        summary: String,
        hops: Vec<HopDiagnostic>,
        round_trip: Option<RoundTripDiagnostic>,
    },

    #[error("no conversion from {from} to {to}")]
    UnsupportedConversion { from: Format, to: Format },

    #[error("invalid format sequence: {reason}")]
    InvalidSequence { reason: String },

    #[error("converter '{converter}' failed: {message}")]
    ConverterFailed { converter: String, message: String },
}

impl CredenceErrorCode for ConversionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConversionIntegrity { .. } => error_code::CONVERSION_INTEGRITY,
            _ => error_code::CONVERSION_ERROR,
        }
    }
}
