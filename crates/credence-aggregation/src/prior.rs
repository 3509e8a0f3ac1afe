//! Where a claim's prior comes from. There is no implicit default.

use serde::{Deserialize, Serialize};
use tracing::debug;

use credence_core::config::AggregationConfig;
use credence_core::errors::{AggregationError, CredenceResult};
use credence_core::models::ClaimKey;
use credence_core::traits::{EstimateSchema, IEstimator, PriorOrigin};

const PRIOR_FIELD: &str = "prior";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PriorSource {
    /// Caller-supplied base rate.
    Supplied { value: f64 },
    /// Base rate configured for a domain in `aggregation.domain_priors`.
    Domain { domain: String },
    /// Ask the injected estimator for the base rate of this claim type in `domain`.
    Estimated { domain: String },
}

impl PriorSource {
    pub fn supplied(value: f64) -> Self {
        Self::Supplied { value }
    }

    pub fn domain(domain: impl Into<String>) -> Self {
        Self::Domain {
            domain: domain.into(),
        }
    }

    pub fn estimated(domain: impl Into<String>) -> Self {
        Self::Estimated {
            domain: domain.into(),
        }
    }

    /// Resolve to a validated prior in [0, 1].
    pub fn resolve(
        &self,
        key: &ClaimKey,
        config: &AggregationConfig,
        estimator: Option<&dyn IEstimator>,
    ) -> CredenceResult<(f64, PriorOrigin)> {
        let (value, origin) = match self {
            Self::Supplied { value } => (*value, PriorOrigin::Supplied),
            Self::Domain { domain } => match config.domain_priors.get(domain) {
                Some(value) => (*value, PriorOrigin::DomainBaseRate),
                None => {
                    return Err(AggregationError::MissingPrior {
                        domain: domain.clone(),
                    }
                    .into())
                }
            },
            Self::Estimated { domain } => {
                let Some(estimator) = estimator else {
                    return Err(AggregationError::MissingPrior {
                        domain: domain.clone(),
                    }
                    .into());
                };
                (estimate_prior(estimator, key, domain)?, PriorOrigin::Estimated)
            }
        };

        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(AggregationError::InvalidParameter {
                name: "prior".to_string(),
                value,
                reason: "must be a finite probability in [0, 1]".to_string(),
            }
            .into());
        }
        debug!(claim = %key, prior = value, origin = ?origin, "resolved prior");
        Ok((value, origin))
    }
}

fn estimate_prior(estimator: &dyn IEstimator, key: &ClaimKey, domain: &str) -> CredenceResult<f64> {
    let schema = EstimateSchema::probabilities(PRIOR_FIELD, &[PRIOR_FIELD]);
    let prompt = format!(
        "Estimate the base rate at which claims of the form '{} {} {}' hold in the domain '{}'. \
         Answer with a probability in [0, 1].",
        key.subject, key.predicate, key.object, domain
    );
    let estimate = estimator.estimate(&prompt, &schema)?;
    schema
        .validate(&estimate)
        .map_err(|message| AggregationError::EstimatorFailed {
            estimator: estimator.name().to_string(),
            message,
        })?;
    estimate.get(PRIOR_FIELD).ok_or_else(|| {
        AggregationError::EstimatorFailed {
            estimator: estimator.name().to_string(),
            message: format!("missing field '{PRIOR_FIELD}'"),
        }
        .into()
    })
}
