//! Pipeline orchestration errors.

use super::error_code::{self, CredenceErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline cancelled")]
    Cancelled,

    #[error("task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error("stability barrier closed before reference '{ref_id}' became stable")]
    BarrierClosed { ref_id: String },

    #[error("resolution scopes failed; claim '{claim_id}' was not committed")]
    ScopesFailed { claim_id: String },

    #[error("claim '{claim_id}' is not present in the store")]
    ClaimNotFound { claim_id: String },
}

impl CredenceErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            _ => error_code::PIPELINE_ERROR,
        }
    }
}
