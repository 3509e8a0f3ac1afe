//! Likelihood models: the calibrated default and an estimator-backed one.

use std::sync::Arc;

use credence_core::config::AggregationConfig;
use credence_core::errors::{AggregationError, CredenceResult};
use credence_core::models::{Evidence, Polarity};
use credence_core::traits::{EstimateSchema, IEstimator, ILikelihoodModel, MarginalLikelihood};

const LIKELIHOOD_SCHEMA: &str = "likelihood";
const GIVEN_H: &str = "given_h";
const GIVEN_NOT_H: &str = "given_not_h";

/// Treats an evidence confidence `c` as calibrated:
///
/// - `P(E|H)  = c`
/// - `P(E|¬H) = fpr + (1 − fpr)(1 − c)`
///
/// Refuting evidence swaps the two. Both are floored so log ratios stay finite.
#[derive(Debug, Clone)]
pub struct CalibratedLikelihoodModel {
    false_positive_rate: f64,
    floor: f64,
}

impl CalibratedLikelihoodModel {
    pub fn new(false_positive_rate: f64, floor: f64) -> Self {
        Self {
            false_positive_rate,
            floor,
        }
    }

    pub fn from_config(config: &AggregationConfig) -> Self {
        Self::new(config.false_positive_rate, config.likelihood_floor)
    }
}

impl ILikelihoodModel for CalibratedLikelihoodModel {
    fn marginal(&self, evidence: &Evidence) -> CredenceResult<MarginalLikelihood> {
        let c = evidence.raw_confidence.value();
        if !c.is_finite() {
            return Err(AggregationError::InvalidParameter {
                name: format!("{}.raw_confidence", evidence.source_id),
                value: c,
                reason: "must be finite".to_string(),
            }
            .into());
        }
        let fpr = self.false_positive_rate;
        let matched = c.max(self.floor);
        let unmatched = (fpr + (1.0 - fpr) * (1.0 - c)).max(self.floor);
        Ok(match evidence.polarity {
            Polarity::Supports => MarginalLikelihood {
                given_h: matched,
                given_not_h: unmatched,
            },
            Polarity::Refutes => MarginalLikelihood {
                given_h: unmatched,
                given_not_h: matched,
            },
        })
    }

    fn name(&self) -> &str {
        "calibrated_confidence"
    }
}

/// Asks the injected estimator for `P(E|H)` and `P(E|¬H)` of each item.
///
/// Both answers must be probabilities; they are floored like the calibrated
/// model's so a zero answer cannot make the joint likelihood degenerate.
pub struct EstimatorLikelihoodModel {
    estimator: Arc<dyn IEstimator>,
    floor: f64,
}

impl EstimatorLikelihoodModel {
    pub fn new(estimator: Arc<dyn IEstimator>, floor: f64) -> Self {
        Self { estimator, floor }
    }

    pub fn from_config(estimator: Arc<dyn IEstimator>, config: &AggregationConfig) -> Self {
        Self::new(estimator, config.likelihood_floor)
    }
}

impl ILikelihoodModel for EstimatorLikelihoodModel {
    fn marginal(&self, evidence: &Evidence) -> CredenceResult<MarginalLikelihood> {
        let schema = EstimateSchema::probabilities(LIKELIHOOD_SCHEMA, &[GIVEN_H, GIVEN_NOT_H]);
        let caveats = if evidence.caveats.is_empty() {
            "none".to_string()
        } else {
            evidence.caveats.join("; ")
        };
        let prompt = format!(
            "Evidence '{}' states that {} {} {} ({:?}, reported confidence {:.3}, caveats: {}). \
             Estimate the probability of observing this evidence if the claim is true ({GIVEN_H}) \
             and if it is false ({GIVEN_NOT_H}).",
            evidence.source_id,
            evidence.subject_ref,
            evidence.predicate,
            evidence.object_ref,
            evidence.polarity,
            evidence.raw_confidence.value(),
            caveats,
        );
        let estimate = self.estimator.estimate(&prompt, &schema)?;
        let failed = |message: String| AggregationError::EstimatorFailed {
            estimator: self.estimator.name().to_string(),
            message,
        };
        schema.validate(&estimate).map_err(failed)?;
        let field = |name: &str| {
            estimate
                .get(name)
                .map(|v| v.max(self.floor))
                .ok_or_else(|| failed(format!("missing field '{name}'")))
        };
        Ok(MarginalLikelihood {
            given_h: field(GIVEN_H)?,
            given_not_h: field(GIVEN_NOT_H)?,
        })
    }

    fn name(&self) -> &str {
        "estimator"
    }
}
