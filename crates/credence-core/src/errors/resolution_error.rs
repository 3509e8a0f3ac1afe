//! Entity resolution errors.

use super::error_code::{self, CredenceErrorCode};

/// Errors raised while resolving entity references within one scope.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Contradictory constraints. Fatal to the resolution scope.
    #[error("constraint conflict between '{ref_id}' and '{target_ref_id}': {reason}")]
    ConstraintConflict {
        ref_id: String,
        target_ref_id: String,
        reason: String,
    },

    #[error("unknown reference '{ref_id}' in scope '{scope}'")]
    UnknownReference { ref_id: String, scope: String },

    #[error("duplicate reference '{ref_id}' in scope '{scope}'")]
    DuplicateReference { ref_id: String, scope: String },

    #[error("unknown candidate entity '{entity_id}' in scope '{scope}'")]
    UnknownCandidate { entity_id: String, scope: String },

    #[error("invalid candidate distribution on '{ref_id}': {reason}")]
    InvalidDistribution { ref_id: String, reason: String },

    #[error("invalid cue for '{ref_id}': {reason}")]
    InvalidCue { ref_id: String, reason: String },

    #[error("scope '{scope}' has no candidate entities")]
    EmptyCandidateSet { scope: String },

    #[error("scope '{scope}' is finalized and accepts no further updates")]
    ScopeFinalized { scope: String },
}

impl CredenceErrorCode for ResolutionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConstraintConflict { .. } => error_code::CONSTRAINT_CONFLICT,
            _ => error_code::RESOLUTION_ERROR,
        }
    }
}
