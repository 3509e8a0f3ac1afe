//! Evidence normalizer errors.

use super::error_code::{self, CredenceErrorCode};

/// Errors raised at the extraction boundary. Bad input is rejected, never guessed at.
#[derive(Debug, thiserror::Error)]
pub enum NormalizationError {
    #[error("malformed extraction from source '{source_id}': {reason}")]
    MalformedExtraction { source_id: String, reason: String },

    #[error("invalid degradation factor {factor} at stage '{stage}': must be in (0, 1]")]
    InvalidDegradationFactor { stage: String, factor: f64 },

    #[error("unknown degradation chain '{name}'")]
    UnknownDegradationChain { name: String },
}

impl CredenceErrorCode for NormalizationError {
    fn error_code(&self) -> &'static str {
        error_code::MALFORMED_EXTRACTION
    }
}
