use serde::{Deserialize, Serialize};

use super::defaults;

/// Cross-modal consistency thresholds. All are explicit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossModalConfig {
    /// Per-step entity preservation. Default: 0.95.
    pub step_entity_threshold: f64,
    /// Per-step relationship preservation. Default: 0.98.
    pub step_relationship_threshold: f64,
    /// Round-trip aggregate (mean of entity and relationship rates). Default: 0.80.
    pub round_trip_aggregate_threshold: f64,
    /// Round-trip entity preservation. Default: 0.95.
    pub round_trip_entity_threshold: f64,
    /// Round-trip relationship preservation. Default: 0.90.
    pub round_trip_relationship_threshold: f64,
    /// Embedding width used by the structural converter. Default: 64.
    pub vector_dimensions: usize,
}

impl Default for CrossModalConfig {
    fn default() -> Self {
        Self {
            step_entity_threshold: defaults::DEFAULT_STEP_ENTITY_THRESHOLD,
            step_relationship_threshold: defaults::DEFAULT_STEP_RELATIONSHIP_THRESHOLD,
            round_trip_aggregate_threshold: defaults::DEFAULT_ROUND_TRIP_AGGREGATE_THRESHOLD,
            round_trip_entity_threshold: defaults::DEFAULT_ROUND_TRIP_ENTITY_THRESHOLD,
            round_trip_relationship_threshold: defaults::DEFAULT_ROUND_TRIP_RELATIONSHIP_THRESHOLD,
            vector_dimensions: defaults::DEFAULT_VECTOR_DIMENSIONS,
        }
    }
}
