use serde::{Deserialize, Serialize};

use crate::errors::CredenceResult;
use crate::models::ClaimKey;

/// Where the prior came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorOrigin {
    Supplied,
    DomainBaseRate,
    Estimated,
}

/// Everything a meta-confidence strategy may look at.
#[derive(Debug, Clone)]
pub struct MetaConfidenceContext<'a> {
    pub claim: &'a ClaimKey,
    pub evidence_count: usize,
    /// Sum of dependence-adjusted evidence weights.
    pub effective_evidence: f64,
    pub prior: f64,
    pub prior_origin: PriorOrigin,
    pub posterior: f64,
    pub independence_coefficient: f64,
    pub domain_notes: &'a [String],
}

/// Confidence in the aggregation parameters themselves. Must return a value
/// in [0, 1]; it multiplies the posterior, so it can only lower confidence.
///
/// Calibration of this factor is an open empirical question, hence a strategy.
pub trait IMetaConfidence: Send + Sync {
    fn meta_confidence(&self, ctx: &MetaConfidenceContext<'_>) -> CredenceResult<f64>;

    fn name(&self) -> &str;
}
