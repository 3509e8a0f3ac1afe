//! Knowledge-graph export records.

use credence_core::constants::CONFIDENCE_TYPE_BAYESIAN;
use credence_core::errors::{AggregationError, CredenceResult, PipelineError};
use credence_core::models::{
    Claim, Evidence, EvidenceSummary, KnowledgeGraphRecord, Polarity, TheoryContext,
};
use credence_core::trace::ReasoningTrace;
use credence_core::TheoryFitResult;

/// Build the export record for a finalized claim.
///
/// `confidence` is the adjusted confidence of the latest epoch. `evidence`
/// must be exactly the items the claim was aggregated from, and `fit`, when
/// given, must belong to the claim.
pub fn knowledge_graph_record(
    claim: &Claim,
    evidence: &[Evidence],
    fit: Option<&TheoryFitResult>,
    trace: &ReasoningTrace,
) -> CredenceResult<KnowledgeGraphRecord> {
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

    let theory_context = match fit {
        Some(fit) if fit.claim_id != claim.claim_id => {
            return Err(PipelineError::TaskFailed {
                task: format!("export {}", claim.claim_id),
                message: format!("theory fit belongs to '{}'", fit.claim_id),
            }
            .into());
        }
        Some(fit) => Some(theory_context(fit)),
        None => None,
    };

    Ok(KnowledgeGraphRecord {
        claim_id: claim.claim_id.clone(),
        subject: claim.subject_entity.clone(),
        predicate: claim.predicate.clone(),
        object: claim.object_entity.clone(),
        confidence: claim.adjusted_confidence,
        confidence_type: CONFIDENCE_TYPE_BAYESIAN.to_string(),
        theory_context,
        evidence_summary: summarize(claim, evidence),
        audit_trail_ref: trace.audit_ref(&claim.claim_id),
    })
}

/// Constructs that map the claim predicate or matched at least one indicator.
fn theory_context(fit: &TheoryFitResult) -> TheoryContext {
    TheoryContext {
        theory_id: fit.theory_id.clone(),
        strength_level: fit.strength_level,
        fit_confidence: fit.fit_confidence,
        constructs: fit
            .construct_matches
            .iter()
            .filter(|m| m.maps_predicate || !m.matched_indicators.is_empty())
            .map(|m| m.construct.clone())
            .collect(),
        hypotheses_supported: fit.hypotheses_supported.clone(),
    }
}

fn summarize(claim: &Claim, evidence: &[Evidence]) -> EvidenceSummary {
    let refuting = evidence
        .iter()
        .filter(|e| e.polarity == Polarity::Refutes)
        .count();
    let mean_raw_confidence = if evidence.is_empty() {
        0.0
    } else {
        evidence.iter().map(|e| e.raw_confidence.value()).sum::<f64>() / evidence.len() as f64
    };
    EvidenceSummary {
        count: claim.evidence_refs.len(),
        supporting: evidence.len() - refuting,
        refuting,
        source_ids: claim.evidence_refs.clone(),
        mean_raw_confidence,
    }
}
