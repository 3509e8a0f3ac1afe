//! Meta-confidence strategies.
//!
//! How much to trust the prior and likelihood parameters is not settled
//! empirically, so the factor is injected. Every strategy returns a value in
//! [0, 1]; the aggregator rejects anything else.

use std::sync::Arc;

use credence_core::errors::{AggregationError, CredenceResult};
use credence_core::traits::{EstimateSchema, IEstimator, IMetaConfidence, MetaConfidenceContext};

const META_FIELD: &str = "meta_confidence";

/// Constant factor. `FixedMetaConfidence(1.0)` disables the discount.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetaConfidence(pub f64);

impl IMetaConfidence for FixedMetaConfidence {
    fn meta_confidence(&self, _ctx: &MetaConfidenceContext<'_>) -> CredenceResult<f64> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Saturating in the effective (dependence-discounted) evidence count:
/// `n_eff / (n_eff + half_saturation)`.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceVolumeMeta {
    pub half_saturation: f64,
}

impl EvidenceVolumeMeta {
    pub fn new(half_saturation: f64) -> Self {
        Self { half_saturation }
    }
}

impl IMetaConfidence for EvidenceVolumeMeta {
    fn meta_confidence(&self, ctx: &MetaConfidenceContext<'_>) -> CredenceResult<f64> {
        let n = ctx.effective_evidence.max(0.0);
        let denom = n + self.half_saturation;
        if denom <= 0.0 {
            return Ok(0.0);
        }
        Ok(n / denom)
    }

    fn name(&self) -> &str {
        "evidence_volume"
    }
}

/// Delegates the judgement to the injected estimator.
pub struct EstimatorMetaConfidence {
    estimator: Arc<dyn IEstimator>,
}

impl EstimatorMetaConfidence {
    pub fn new(estimator: Arc<dyn IEstimator>) -> Self {
        Self { estimator }
    }
}

impl IMetaConfidence for EstimatorMetaConfidence {
    fn meta_confidence(&self, ctx: &MetaConfidenceContext<'_>) -> CredenceResult<f64> {
        let schema = EstimateSchema::probabilities(META_FIELD, &[META_FIELD]);
        let notes = if ctx.domain_notes.is_empty() {
            "none".to_string()
        } else {
            ctx.domain_notes.join("; ")
        };
        let prompt = format!(
            "Rate confidence in the parameters used to score the claim {}: prior {:.4} ({:?}), \
             {} evidence items ({:.2} effective), independence coefficient {:.2}, posterior {:.4}. \
             Domain notes: {}.",
            ctx.claim,
            ctx.prior,
            ctx.prior_origin,
            ctx.evidence_count,
            ctx.effective_evidence,
            ctx.independence_coefficient,
            ctx.posterior,
            notes,
        );
        let estimate = self.estimator.estimate(&prompt, &schema)?;
        let failed = |message: String| AggregationError::EstimatorFailed {
            estimator: self.estimator.name().to_string(),
            message,
        };
        schema.validate(&estimate).map_err(failed)?;
        estimate
            .get(META_FIELD)
            .ok_or_else(|| failed(format!("missing field '{META_FIELD}'")).into())
    }

    fn name(&self) -> &str {
        "estimator"
    }
}
