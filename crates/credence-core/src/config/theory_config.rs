use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::StrengthLevel;

/// One band of the strength rubric. A claim reaches the band only if both
/// values strictly exceed the minimums, so boundary ties fall to the lower level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthBand {
    pub level: StrengthLevel,
    pub min_coverage: f64,
    pub min_confidence: f64,
}

/// Theory fit assessor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TheoryConfig {
    /// Minimum indicator confidence for a hypothesis to count as supported. Default: 0.6.
    pub hypothesis_floor: f64,
    /// Minimum share of indicator tokens an attribute must contain. Default: 0.5.
    pub indicator_min_overlap: f64,
    /// Bands above `weak`, checked from strongest to weakest.
    pub strength_bands: Vec<StrengthBand>,
}

impl Default for TheoryConfig {
    fn default() -> Self {
        Self {
            hypothesis_floor: defaults::DEFAULT_HYPOTHESIS_FLOOR,
            indicator_min_overlap: defaults::DEFAULT_INDICATOR_MIN_OVERLAP,
            strength_bands: vec![
                StrengthBand {
                    level: StrengthLevel::Foundational,
                    min_coverage: 0.75,
                    min_confidence: 0.85,
                },
                StrengthBand {
                    level: StrengthLevel::Strong,
                    min_coverage: 0.5,
                    min_confidence: 0.7,
                },
                StrengthBand {
                    level: StrengthLevel::Moderate,
                    min_coverage: 0.25,
                    min_confidence: 0.5,
                },
            ],
        }
    }
}
