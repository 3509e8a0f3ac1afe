//! TheoryFitAssessor: finalized claim + evidence + schema → TheoryFitResult.

use serde_json::json;
use tracing::{debug, info, warn};

use credence_core::config::TheoryConfig;
use credence_core::errors::{AggregationError, CredenceResult, TheoryFitError};
use credence_core::models::{
    Claim, ConstructMatch, Evidence, HypothesisSupport, TheoryFitResult, TheorySchema,
};
use credence_core::trace::{ReasoningTrace, TraceComponent};
use credence_observability::theory_fit_span;

use crate::hypotheses;
use crate::matching::{self, ConstructHits};
use crate::rubric;
use crate::schema::validate_schema;

pub struct TheoryFitAssessor {
    config: TheoryConfig,
}

impl TheoryFitAssessor {
    pub fn new(config: &TheoryConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &TheoryConfig {
        &self.config
    }

    /// Assess `claim` against `schema`.
    ///
    /// `evidence` must be items the claim was aggregated from. Fails with
    /// `SchemaMismatch` when no construct covers the claim predicate, either
    /// by listing it or through an indicator matching a predicate.
    pub fn assess(
        &self,
        claim: &Claim,
        evidence: &[Evidence],
        schema: &TheorySchema,
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<TheoryFitResult> {
        let _span = theory_fit_span!(claim.claim_id, schema.theory_id).entered();

        validate_schema(schema)?;
        if let Some(foreign) = evidence
            .iter()
            .find(|e| !claim.evidence_refs.contains(&e.source_id))
        {
            return Err(AggregationError::ForeignEvidence {
                source_id: foreign.source_id.clone(),
                claim: claim.claim_id.clone(),
            }
            .into());
        }

        let attributes = matching::attributes(claim, evidence);
        let construct_matches: Vec<ConstructMatch> = schema
            .constructs
            .iter()
            .map(|construct| {
                let ConstructHits {
                    matches,
                    predicate_hit,
                } = matching::match_construct(
                    construct,
                    &attributes,
                    self.config.indicator_min_overlap,
                );
                let total = construct.observable_indicators.len();
                let coverage = matches.len() as f64 / total as f64;
                let mean = if matches.is_empty() {
                    0.0
                } else {
                    matches.iter().map(|m| m.confidence).sum::<f64>() / matches.len() as f64
                };
                ConstructMatch {
                    construct: construct.name.clone(),
                    total_indicators: total,
                    coverage,
                    construct_match_confidence: coverage * mean,
                    maps_predicate: predicate_hit || construct.predicates.contains(&claim.predicate),
                    matched_indicators: matches,
                }
            })
            .collect();

        let mapped: Vec<&ConstructMatch> = construct_matches.iter().filter(|m| m.maps_predicate).collect();
        if mapped.is_empty() {
            warn!(
                claim_id = %claim.claim_id,
                theory_id = %schema.theory_id,
                predicate = %claim.predicate,
                "no construct maps claim predicate"
            );
            return Err(TheoryFitError::SchemaMismatch {
                theory_id: schema.theory_id.clone(),
                predicate: claim.predicate.clone(),
            }
            .into());
        }

        let matched: usize = mapped.iter().map(|m| m.matched_indicators.len()).sum();
        let total: usize = mapped.iter().map(|m| m.total_indicators).sum();
        let coverage = matched as f64 / total as f64;
        let fit_confidence = mapped
            .iter()
            .map(|m| m.construct_match_confidence)
            .fold(0.0, f64::max);
        let strength_level = rubric::classify(
            &self.config.strength_bands,
            coverage,
            claim.posterior_confidence,
        );
        debug!(
            mapped = mapped.len(),
            coverage,
            fit_confidence,
            strength = strength_level.as_str(),
            "classified claim strength"
        );

        let hypothesis_verdicts: Vec<_> = schema
            .hypotheses
            .iter()
            .map(|h| hypotheses::evaluate(h, &construct_matches, self.config.hypothesis_floor))
            .collect();
        let hypotheses_supported = hypothesis_verdicts
            .iter()
            .filter(|v| v.support == HypothesisSupport::Supported)
            .map(|v| v.hypothesis_id.clone())
            .collect();

        let result = TheoryFitResult {
            claim_id: claim.claim_id.clone(),
            theory_id: schema.theory_id.clone(),
            construct_matches,
            strength_level,
            fit_confidence,
            hypotheses_supported,
            hypothesis_verdicts,
        };

        trace.record(
            TraceComponent::TheoryFit,
            "assess",
            &claim.claim_id,
            json!({
                "theory_id": result.theory_id,
                "coverage": coverage,
                "strength_level": result.strength_level,
                "fit_confidence": result.fit_confidence,
                "hypotheses": result.hypothesis_verdicts,
            }),
        );
        info!(
            claim_id = %claim.claim_id,
            theory_id = %schema.theory_id,
            strength = result.strength_level.as_str(),
            supported = result.hypotheses_supported.len(),
            "assessed theory fit"
        );
        Ok(result)
    }
}
