use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Dependency-aware aggregator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Rate at which a source reports a relationship that does not hold,
    /// independent of its own calibration. Default: 0.1.
    pub false_positive_rate: f64,
    /// Lower bound on any marginal likelihood, keeping log ratios finite. Default: 1e-6.
    pub likelihood_floor: f64,
    /// Base rates per domain, used when a request names a domain instead of a prior.
    /// Empty by default; a missing entry is an error, never a guess.
    pub domain_priors: BTreeMap<String, f64>,
    /// Effective evidence count at which the volume meta-confidence reaches 0.5. Default: 1.0.
    pub volume_half_saturation: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            false_positive_rate: defaults::DEFAULT_FALSE_POSITIVE_RATE,
            likelihood_floor: defaults::DEFAULT_LIKELIHOOD_FLOOR,
            domain_priors: BTreeMap::new(),
            volume_half_saturation: defaults::DEFAULT_VOLUME_HALF_SATURATION,
        }
    }
}
