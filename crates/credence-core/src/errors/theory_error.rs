//! Theory fit errors.

use super::error_code::{self, CredenceErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum TheoryFitError {
    /// The claim predicate has no mapped construct in the schema.
    #[error("schema mismatch: theory '{theory_id}' has no construct mapped to predicate '{predicate}'")]
    SchemaMismatch { theory_id: String, predicate: String },

    #[error("invalid theory schema: {reason}")]
    InvalidSchema { reason: String },
}

impl CredenceErrorCode for TheoryFitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaMismatch { .. } => error_code::SCHEMA_MISMATCH,
            Self::InvalidSchema { .. } => error_code::INVALID_SCHEMA,
        }
    }
}
