use serde::{Deserialize, Serialize};

use super::defaults;

/// Entity resolver configuration, including the cue likelihood table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Top-candidate probability at which a reference counts as resolved. Default: 0.85.
    pub resolution_threshold: f64,
    /// Top-candidate probability at which a reference is partially resolved. Default: 0.5.
    pub partial_threshold: f64,
    /// Likelihood of a self-identification cue for the named entity. Default: 0.98.
    pub self_identification_match: f64,
    /// Likelihood of a self-identification cue for any other entity or Unknown. Default: 0.02.
    pub self_identification_mismatch: f64,
    /// Likelihood of an oppositional cue for the in-group entity. Default: 0.35.
    pub oppositional_in_group: f64,
    /// Highest likelihood an associative cue can assign its entity. Default: 0.8.
    pub associative_ceiling: f64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            resolution_threshold: defaults::DEFAULT_RESOLUTION_THRESHOLD,
            partial_threshold: defaults::DEFAULT_PARTIAL_THRESHOLD,
            self_identification_match: defaults::DEFAULT_SELF_IDENTIFICATION_MATCH,
            self_identification_mismatch: defaults::DEFAULT_SELF_IDENTIFICATION_MISMATCH,
            oppositional_in_group: defaults::DEFAULT_OPPOSITIONAL_IN_GROUP,
            associative_ceiling: defaults::DEFAULT_ASSOCIATIVE_CEILING,
        }
    }
}
