//! EvidenceNormalizer: extraction record + degradation chain → Evidence.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{debug, warn};

use credence_core::config::NormalizerConfig;
use credence_core::errors::NormalizationError;
use credence_core::models::Evidence;
use credence_core::trace::{ReasoningTrace, TraceComponent};
use credence_core::Confidence;
use credence_observability::normalize_span;

use crate::chain::DegradationChain;
use crate::extraction::RawExtraction;

/// Validates extraction records and applies degradation chains.
pub struct EvidenceNormalizer {
    chains: BTreeMap<String, DegradationChain>,
}

impl EvidenceNormalizer {
    /// Build a normalizer from configured named chains. Every factor is validated up front.
    pub fn new(config: &NormalizerConfig) -> Result<Self, NormalizationError> {
        let mut chains = BTreeMap::new();
        for (name, stages) in &config.chains {
            chains.insert(name.clone(), DegradationChain::new(stages.clone())?);
        }
        Ok(Self { chains })
    }

    /// Look up a configured chain by name.
    pub fn chain(&self, name: &str) -> Result<&DegradationChain, NormalizationError> {
        self.chains
            .get(name)
            .ok_or_else(|| NormalizationError::UnknownDegradationChain {
                name: name.to_string(),
            })
    }

    pub fn chain_names(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    /// Normalize one record.
    ///
    /// `raw_confidence = extraction_confidence × Π(retention)`. Rejections are
    /// recorded in the trace before the error is returned.
    pub fn normalize(
        &self,
        raw: &RawExtraction,
        chain: &DegradationChain,
        trace: &mut ReasoningTrace,
    ) -> Result<Evidence, NormalizationError> {
        let _span = normalize_span!(raw.source_id).entered();

        match build_evidence(raw, chain) {
            Ok(evidence) => {
                debug!(
                    source_id = %evidence.source_id,
                    extraction_confidence = evidence.extraction_confidence.value(),
                    raw_confidence = evidence.raw_confidence.value(),
                    stages = evidence.degradation_factors.len(),
                    "normalized extraction"
                );
                trace.record(
                    TraceComponent::Normalizer,
                    "normalize",
                    &evidence.source_id,
                    json!({
                        "predicate": evidence.predicate,
                        "extraction_confidence": evidence.extraction_confidence.value(),
                        "retention": chain.retention(),
                        "raw_confidence": evidence.raw_confidence.value(),
                    }),
                );
                Ok(evidence)
            }
            Err(err) => {
                warn!(source_id = %raw.source_id, error = %err, "rejected extraction");
                trace.record(
                    TraceComponent::Normalizer,
                    "reject",
                    &raw.source_id,
                    json!({ "error": err.to_string() }),
                );
                Err(err)
            }
        }
    }

    /// Normalize with a configured chain.
    pub fn normalize_with(
        &self,
        raw: &RawExtraction,
        chain_name: &str,
        trace: &mut ReasoningTrace,
    ) -> Result<Evidence, NormalizationError> {
        let chain = self.chain(chain_name)?;
        self.normalize(raw, chain, trace)
    }

    /// Parse and normalize one JSON record.
    pub fn normalize_json(
        &self,
        json: &str,
        chain: &DegradationChain,
        trace: &mut ReasoningTrace,
    ) -> Result<Evidence, NormalizationError> {
        let raw = match RawExtraction::from_json(json) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "unparseable extraction");
                if let NormalizationError::MalformedExtraction { source_id, .. } = &err {
                    trace.record(
                        TraceComponent::Normalizer,
                        "reject",
                        source_id,
                        json!({ "error": err.to_string() }),
                    );
                }
                return Err(err);
            }
        };
        self.normalize(&raw, chain, trace)
    }

    /// Normalize a batch. One result per input, in input order; a bad record
    /// yields its own error and never removes or alters its neighbours.
    pub fn normalize_batch(
        &self,
        records: &[RawExtraction],
        chain: &DegradationChain,
        trace: &mut ReasoningTrace,
    ) -> Vec<Result<Evidence, NormalizationError>> {
        let results: Vec<_> = records
            .iter()
            .map(|raw| self.normalize(raw, chain, trace))
            .collect();
        let rejected = results.iter().filter(|r| r.is_err()).count();
        debug!(total = results.len(), rejected, "normalized batch");
        results
    }
}

fn build_evidence(
    raw: &RawExtraction,
    chain: &DegradationChain,
) -> Result<Evidence, NormalizationError> {
    let malformed = |reason: String| NormalizationError::MalformedExtraction {
        source_id: raw.source_id.clone(),
        reason,
    };

    if raw.source_id.trim().is_empty() {
        return Err(malformed("source_id is blank".to_string()));
    }
    let predicate = required_field("predicate", raw.predicate.as_deref()).map_err(&malformed)?;
    let subject_ref =
        required_field("subject_ref", raw.subject_ref.as_deref()).map_err(&malformed)?;
    let object_ref = required_field("object_ref", raw.object_ref.as_deref()).map_err(&malformed)?;

    let extraction_confidence = Confidence::checked(raw.raw_confidence).ok_or_else(|| {
        malformed(format!(
            "raw_confidence {} is not a finite value in [0, 1]",
            raw.raw_confidence
        ))
    })?;

    Ok(Evidence {
        source_id: raw.source_id.clone(),
        predicate,
        subject_ref,
        object_ref,
        extraction_confidence,
        raw_confidence: Confidence::new(extraction_confidence.value() * chain.retention()),
        degradation_factors: chain.stages().to_vec(),
        temporal_context: raw.temporal_context.clone(),
        caveats: raw.caveats.clone(),
        polarity: raw.polarity,
    })
}

fn required_field(name: &str, value: Option<&str>) -> Result<String, String> {
    match value.map(str::trim) {
        None => Err(format!("{name} is missing")),
        Some("") => Err(format!("{name} is blank")),
        Some(v) => Ok(v.to_string()),
    }
}
