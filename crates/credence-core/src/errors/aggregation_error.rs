//! Dependency-aware aggregation errors.

use super::error_code::{self, CredenceErrorCode};

/// Aggregation precondition and parameter errors. The caller must supply
/// more or valid input; nothing is defaulted.
#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("insufficient evidence for claim '{claim}': at least one evidence item is required")]
    InsufficientEvidence { claim: String },

    #[error("invalid dependency graph: {reason}")]
    InvalidDependencyGraph { reason: String },

    #[error("no prior configured or supplied for domain '{domain}'")]
    MissingPrior { domain: String },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    #[error("estimator '{estimator}' failed: {message}")]
    EstimatorFailed { estimator: String, message: String },

    #[error("evidence '{source_id}' does not belong to claim '{claim}'")]
    ForeignEvidence { source_id: String, claim: String },

    #[error("claim '{claim_id}' was not scored against reference '{ref_id}'")]
    UnaffectedClaim { claim_id: String, ref_id: String },
}

impl CredenceErrorCode for AggregationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEvidence { .. } => error_code::INSUFFICIENT_EVIDENCE,
            Self::InvalidDependencyGraph { .. } => error_code::INVALID_DEPENDENCY_GRAPH,
            _ => error_code::AGGREGATION_ERROR,
        }
    }
}
