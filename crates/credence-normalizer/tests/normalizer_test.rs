//! Evidence normalizer tests: strict intake, degradation, batch behaviour.

use std::collections::BTreeMap;

use credence_core::config::NormalizerConfig;
use credence_core::errors::{CredenceErrorCode, NormalizationError};
use credence_core::models::{DegradationFactor, Polarity};
use credence_core::trace::TraceComponent;
use credence_core::ReasoningTrace;
use credence_normalizer::{DegradationChain, EvidenceNormalizer, RawExtraction};
use proptest::prelude::*;
use test_fixtures::{approx_eq, load_fixture_str, ocr_chain, paths};

fn normalizer() -> EvidenceNormalizer {
    let mut chains = BTreeMap::new();
    chains.insert("ocr_pipeline".to_string(), ocr_chain());
    EvidenceNormalizer::new(&NormalizerConfig { chains }).unwrap()
}

fn raw(conf: f64) -> RawExtraction {
    RawExtraction::new("src-1", "influenced", "ref-a", "ref-b", conf)
}

// ── Degradation ──────────────────────────────────────────────────────────

#[test]
fn applies_degradation_chain_multiplicatively() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let ev = n.normalize_with(&raw(0.9), "ocr_pipeline", &mut trace).unwrap();

    assert!(approx_eq(ev.extraction_confidence.value(), 0.9, 1e-12));
    assert!(approx_eq(ev.raw_confidence.value(), 0.9 * 0.95 * 0.98, 1e-12));
    assert_eq!(ev.degradation_factors.len(), 2);
    assert_eq!(ev.degradation_factors[0].stage, "ocr");
    assert!(approx_eq(ev.retention(), 0.95 * 0.98, 1e-12));
}

#[test]
fn empty_chain_keeps_confidence() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let ev = n
        .normalize(&raw(0.7), &DegradationChain::empty(), &mut trace)
        .unwrap();
    assert_eq!(ev.raw_confidence.value(), 0.7);
    assert!(ev.degradation_factors.is_empty());
}

#[test]
fn unknown_chain_is_an_error() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let err = n.normalize_with(&raw(0.7), "missing", &mut trace).unwrap_err();
    assert!(matches!(err, NormalizationError::UnknownDegradationChain { .. }));
}

#[test]
fn invalid_configured_factor_rejected_at_construction() {
    let mut chains = BTreeMap::new();
    chains.insert("bad".to_string(), vec![DegradationFactor::new("ocr", 1.5)]);
    let err = EvidenceNormalizer::new(&NormalizerConfig { chains })
        .err()
        .unwrap();
    assert!(matches!(
        err,
        NormalizationError::InvalidDegradationFactor { ref stage, .. } if stage == "ocr"
    ));
}

// ── Strict intake ────────────────────────────────────────────────────────

#[test]
fn missing_predicate_is_malformed() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let mut r = raw(0.8);
    r.predicate = None;
    let err = n
        .normalize(&r, &DegradationChain::empty(), &mut trace)
        .unwrap_err();
    match err {
        NormalizationError::MalformedExtraction { source_id, reason } => {
            assert_eq!(source_id, "src-1");
            assert!(reason.contains("predicate"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_subject_and_object_are_malformed() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();

    let mut r = raw(0.8);
    r.subject_ref = Some("   ".to_string());
    assert!(n.normalize(&r, &DegradationChain::empty(), &mut trace).is_err());

    let mut r = raw(0.8);
    r.object_ref = None;
    assert!(n.normalize(&r, &DegradationChain::empty(), &mut trace).is_err());
}

#[test]
fn out_of_range_confidence_is_rejected_not_clamped() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    for bad in [1.2, -0.01, f64::NAN, f64::INFINITY] {
        let err = n
            .normalize(&raw(bad), &DegradationChain::empty(), &mut trace)
            .unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_EXTRACTION");
    }
}

#[test]
fn unknown_json_field_is_rejected() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let json = r#"{"source_id":"s1","predicate":"p","subject_ref":"a","object_ref":"b",
                   "raw_confidence":0.5,"confidense":0.9}"#;
    let err = n
        .normalize_json(json, &DegradationChain::empty(), &mut trace)
        .unwrap_err();
    match err {
        NormalizationError::MalformedExtraction { source_id, reason } => {
            assert_eq!(source_id, "s1");
            assert!(reason.contains("confidense"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_json_field_is_rejected() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let json = r#"{"source_id":"s1","subject_ref":"a","object_ref":"b","raw_confidence":0.5}"#;
    let err = n
        .normalize_json(json, &DegradationChain::empty(), &mut trace)
        .unwrap_err();
    assert!(err.to_string().contains("predicate"));
}

#[test]
fn optional_fields_are_carried_through() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let json = r#"{"source_id":"s1","predicate":"opposes","subject_ref":"a","object_ref":"b",
                   "raw_confidence":0.6,"caveats":["hedged"],"temporal_context":"1971",
                   "polarity":"refutes"}"#;
    let ev = n
        .normalize_json(json, &DegradationChain::empty(), &mut trace)
        .unwrap();
    assert_eq!(ev.caveats, vec!["hedged".to_string()]);
    assert_eq!(ev.temporal_context.as_deref(), Some("1971"));
    assert_eq!(ev.polarity, Polarity::Refutes);
}

#[test]
fn worked_example_fixture_parses() {
    let records =
        RawExtraction::many_from_json(&load_fixture_str(paths::WORKED_EXAMPLE_EXTRACTIONS))
            .unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.predicate.as_deref() == Some("influenced")));
}

// ── Batch and trace ──────────────────────────────────────────────────────

#[test]
fn batch_returns_one_result_per_record_in_order() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let mut bad = raw(0.5);
    bad.source_id = "src-bad".to_string();
    bad.subject_ref = None;
    let records = vec![raw(0.9), bad, raw(0.4)];

    let results = n.normalize_batch(&records, n.chain("ocr_pipeline").unwrap(), &mut trace);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(approx_eq(
        results[2].as_ref().unwrap().raw_confidence.value(),
        0.4 * 0.95 * 0.98,
        1e-12
    ));
}

#[test]
fn trace_records_accepts_and_rejections() {
    let n = normalizer();
    let mut trace = ReasoningTrace::new();
    let mut bad = raw(0.5);
    bad.source_id = "src-bad".to_string();
    bad.predicate = Some(String::new());

    let _ = n.normalize(&raw(0.9), &DegradationChain::empty(), &mut trace);
    let _ = n.normalize(&bad, &DegradationChain::empty(), &mut trace);

    assert_eq!(trace.len(), 2);
    assert!(trace
        .entries()
        .iter()
        .all(|e| e.component == TraceComponent::Normalizer));
    assert_eq!(trace.entries()[0].operation, "normalize");
    assert_eq!(trace.entries()[1].operation, "reject");
    assert_eq!(trace.entries()[1].subject, "src-bad");
}

// ── Properties ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn normalized_confidence_never_exceeds_extraction(
        conf in 0.0f64..=1.0,
        factors in proptest::collection::vec(0.01f64..=1.0, 0..5),
    ) {
        let stages = factors
            .iter()
            .enumerate()
            .map(|(i, f)| DegradationFactor::new(format!("stage-{i}"), *f))
            .collect();
        let chain = DegradationChain::new(stages).unwrap();
        let mut trace = ReasoningTrace::new();
        let ev = normalizer().normalize(&raw(conf), &chain, &mut trace).unwrap();
        prop_assert!(ev.raw_confidence.value() <= ev.extraction_confidence.value() + 1e-12);
        prop_assert!(ev.raw_confidence.value() >= 0.0);
    }
}
