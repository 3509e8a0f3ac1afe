use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;

/// Whether a piece of evidence supports or refutes its claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    Supports,
    Refutes,
}

/// One stage of a degradation chain and the share of confidence it retains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationFactor {
    pub stage: String,
    /// Retention factor in (0, 1].
    pub retention: f64,
}

impl DegradationFactor {
    pub fn new(stage: impl Into<String>, retention: f64) -> Self {
        Self {
            stage: stage.into(),
            retention,
        }
    }
}

/// One source's extracted support for a claim.
///
/// Write-once: produced by the normalizer and only ever read afterwards.
/// `source_id` doubles as the evidence identifier inside dependency descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source_id: String,
    pub predicate: String,
    pub subject_ref: String,
    pub object_ref: String,
    /// Confidence reported by the extraction tool, before degradation.
    pub extraction_confidence: Confidence,
    /// `extraction_confidence × Π(degradation_factors)`.
    pub raw_confidence: Confidence,
    pub degradation_factors: Vec<DegradationFactor>,
    pub temporal_context: Option<String>,
    pub caveats: Vec<String>,
    pub polarity: Polarity,
}

impl Evidence {
    /// Product of all retention factors (1.0 for an empty chain).
    pub fn retention(&self) -> f64 {
        self.degradation_factors
            .iter()
            .map(|f| f.retention)
            .product()
    }
}
