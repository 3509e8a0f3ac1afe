//! The extraction-layer input record.

use credence_core::errors::NormalizationError;
use credence_core::models::Polarity;
use serde::{Deserialize, Serialize};

/// Source id reported when a record is too malformed to carry one.
pub const UNKNOWN_SOURCE: &str = "<unknown>";

/// One extraction as emitted by an upstream relation-extraction tool.
///
/// `predicate`, `subject_ref` and `object_ref` are modelled as optional so
/// that a missing field is reported by name instead of as a generic parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawExtraction {
    pub source_id: String,
    pub predicate: Option<String>,
    pub subject_ref: Option<String>,
    pub object_ref: Option<String>,
    /// Confidence reported by the extraction tool.
    pub raw_confidence: f64,
    #[serde(default)]
    pub caveats: Vec<String>,
    #[serde(default)]
    pub temporal_context: Option<String>,
    #[serde(default)]
    pub polarity: Polarity,
}

impl RawExtraction {
    pub fn new(
        source_id: impl Into<String>,
        predicate: impl Into<String>,
        subject_ref: impl Into<String>,
        object_ref: impl Into<String>,
        raw_confidence: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            predicate: Some(predicate.into()),
            subject_ref: Some(subject_ref.into()),
            object_ref: Some(object_ref.into()),
            raw_confidence,
            caveats: Vec::new(),
            temporal_context: None,
            polarity: Polarity::Supports,
        }
    }

    /// Parse one record from JSON. Non-conforming input is a malformed extraction.
    pub fn from_json(json: &str) -> Result<Self, NormalizationError> {
        serde_json::from_str(json).map_err(|e| NormalizationError::MalformedExtraction {
            source_id: source_id_hint(json),
            reason: e.to_string(),
        })
    }

    /// Parse a JSON array of records; one bad record rejects the whole array.
    pub fn many_from_json(json: &str) -> Result<Vec<Self>, NormalizationError> {
        serde_json::from_str(json).map_err(|e| NormalizationError::MalformedExtraction {
            source_id: UNKNOWN_SOURCE.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Best-effort source id for error reports on unparseable records.
fn source_id_hint(json: &str) -> String {
    serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|v| v.get("source_id").and_then(|s| s.as_str()).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}
