//! Knowledge-graph records, the in-memory store, and lineage restriction.

use std::collections::BTreeSet;

use credence_core::config::TheoryConfig;
use credence_core::errors::CredenceErrorCode;
use credence_core::models::{Claim, ClaimKey, DependencyDescriptor, EpochReason, Evidence};
use credence_core::traits::IClaimSink;
use credence_core::ReasoningTrace;
use credence_pipeline::{knowledge_graph_record, restrict_dependencies, MemoryClaimStore};
use credence_theory::TheoryFitAssessor;
use test_fixtures::{
    approx_eq, evidence, refuting_evidence, social_identity_theory, worked_example_evidence,
};

fn claim_for(predicate: &str, evidence: &[Evidence]) -> Claim {
    let key = ClaimKey::new("e-tajfel", predicate, "e-turner");
    Claim {
        claim_id: key.claim_id(),
        subject_entity: key.subject,
        predicate: key.predicate,
        object_entity: key.object,
        evidence_refs: evidence.iter().map(|e| e.source_id.clone()).collect(),
        dependency_graph: DependencyDescriptor::independent(),
        posterior_confidence: 0.0,
        meta_confidence: 0.0,
        adjusted_confidence: 0.0,
        epochs: Vec::new(),
    }
    .with_epoch(0.15, 0.9, 0.8, EpochReason::Initial)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[test]
fn record_counts_polarity_and_uses_adjusted_confidence() {
    let ev = vec![evidence("e1", 0.9), evidence("e2", 0.7), refuting_evidence("e3", 0.5)];
    let claim = claim_for("influenced", &ev);
    let trace = ReasoningTrace::new();
    let record = knowledge_graph_record(&claim, &ev, None, &trace).unwrap();

    assert!(approx_eq(record.confidence, 0.72, 1e-12));
    assert_eq!(record.evidence_summary.count, 3);
    assert_eq!(record.evidence_summary.supporting, 2);
    assert_eq!(record.evidence_summary.refuting, 1);
    assert!(approx_eq(record.evidence_summary.mean_raw_confidence, 0.7, 1e-12));
    assert!(record.theory_context.is_none());
    assert_eq!(
        record.audit_trail_ref,
        format!("trace:{}/{}", trace.run_id(), claim.claim_id)
    );
}

#[test]
fn record_carries_theory_context() {
    let ev = worked_example_evidence();
    let claim = claim_for("influenced", &ev);
    let mut trace = ReasoningTrace::new();
    let fit = TheoryFitAssessor::new(&TheoryConfig::default())
        .assess(&claim, &ev, &social_identity_theory(), &mut trace)
        .unwrap();
    let record = knowledge_graph_record(&claim, &ev, Some(&fit), &trace).unwrap();

    let context = record.theory_context.unwrap();
    assert_eq!(context.strength_level, fit.strength_level);
    assert_eq!(context.fit_confidence, fit.fit_confidence);
    assert_eq!(context.constructs, ["intellectual_influence"]);
}

#[test]
fn foreign_evidence_is_rejected() {
    let ev = vec![evidence("e1", 0.9)];
    let claim = claim_for("influenced", &ev);
    let err = knowledge_graph_record(&claim, &[evidence("e9", 0.9)], None, &ReasoningTrace::new())
        .unwrap_err();
    assert_eq!(err.error_code(), "AGGREGATION_ERROR");
}

#[test]
fn fit_for_another_claim_is_rejected() {
    let ev = worked_example_evidence();
    let influenced = claim_for("influenced", &ev);
    let mut trace = ReasoningTrace::new();
    let fit = TheoryFitAssessor::new(&TheoryConfig::default())
        .assess(&influenced, &ev, &social_identity_theory(), &mut trace)
        .unwrap();

    let other = claim_for("favors", &ev);
    let err = knowledge_graph_record(&other, &ev, Some(&fit), &trace).unwrap_err();
    assert_eq!(err.error_code(), "PIPELINE_ERROR");
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[test]
fn store_replaces_claims_whole_and_lists_them_sorted() {
    let store = MemoryClaimStore::new();
    let ev = vec![evidence("e1", 0.9)];
    let first = claim_for("influenced", &ev);
    let second = claim_for("mentored", &ev);

    store.commit(first.clone()).unwrap();
    store.commit(second.clone()).unwrap();
    let updated = first.clone().with_epoch(0.15, 0.95, 0.8, EpochReason::EvidenceChanged);
    store.commit(updated.clone()).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&first.claim_id).unwrap().epochs.len(), 2);
    let mut expected = vec![first.claim_id.clone(), second.claim_id.clone()];
    expected.sort();
    assert_eq!(store.claim_ids(), expected);
    assert_eq!(store.snapshot().len(), 2);
}

#[test]
fn missing_claim_is_reported() {
    let store = MemoryClaimStore::new();
    assert!(store.is_empty());
    let err = store.require("claim-missing").unwrap_err();
    assert_eq!(err.error_code(), "PIPELINE_ERROR");
    assert!(err.to_string().contains("claim-missing"));
}

// ---------------------------------------------------------------------------
// Lineage restriction
// ---------------------------------------------------------------------------

#[test]
fn restriction_keeps_only_internal_lineage() {
    let deps = DependencyDescriptor::with_coefficient(0.7)
        .derived("b", "a", 1.0)
        .derived("c", "x", 0.5)
        .group(["a", "b", "x"], 0.3)
        .group(["c", "y"], 0.9);
    let ids: BTreeSet<&str> = ["a", "b", "c"].into_iter().collect();
    let restricted = restrict_dependencies(&deps, &ids);

    assert_eq!(restricted.depends_on.len(), 1);
    assert_eq!(restricted.depends_on[0].evidence_id, "b");
    assert_eq!(restricted.groups.len(), 1);
    assert_eq!(restricted.groups[0].members, ["a", "b"]);
    assert_eq!(restricted.independence_coefficient, 0.7);
}
