use serde::{Deserialize, Serialize};

use crate::errors::CredenceResult;
use crate::models::Evidence;

/// `P(E|H)` and `P(E|¬H)` for a single evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginalLikelihood {
    pub given_h: f64,
    pub given_not_h: f64,
}

impl MarginalLikelihood {
    /// Log likelihood ratio; positive when the evidence favours H.
    pub fn log_ratio(&self) -> f64 {
        self.given_h.ln() - self.given_not_h.ln()
    }
}

/// Maps one evidence item to its marginal likelihoods.
pub trait ILikelihoodModel: Send + Sync {
    fn marginal(&self, evidence: &Evidence) -> CredenceResult<MarginalLikelihood>;

    fn name(&self) -> &str;
}
