//! Shared fixtures for Credence integration tests.
//!
//! Provides the JSON fixture loader, evidence builders, and deterministic
//! doubles for the injected estimator seam.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;

use credence_core::errors::{AggregationError, CredenceResult};
use credence_core::models::{DegradationFactor, Evidence, GraphData, Polarity, TheorySchema};
use credence_core::traits::{Estimate, EstimateSchema, IEstimator};
use credence_core::Confidence;

/// Fixture paths used across crates.
pub mod paths {
    pub const TEN_NODE_GRAPH: &str = "graphs/ten_node_fifteen_edge.json";
    pub const SOCIAL_IDENTITY_THEORY: &str = "theories/social_identity.json";
    pub const WORKED_EXAMPLE_EXTRACTIONS: &str = "extractions/worked_example.json";
}

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Load a fixture file as a string.
///
/// # Panics
/// Panics if the file doesn't exist.
pub fn load_fixture_str(relative_path: &str) -> String {
    let path = fixture_path(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture_str(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", relative_path, e))
}

/// The 10-node / 15-edge graph used by round-trip tests.
pub fn ten_node_graph() -> GraphData {
    load_fixture(paths::TEN_NODE_GRAPH)
}

pub fn social_identity_theory() -> TheorySchema {
    load_fixture(paths::SOCIAL_IDENTITY_THEORY)
}

// ── Evidence builders ────────────────────────────────────────────────────

/// Supporting evidence for `(ref-a influenced ref-b)` with no degradation.
pub fn evidence(source_id: &str, confidence: f64) -> Evidence {
    evidence_for(source_id, "ref-a", "influenced", "ref-b", confidence)
}

pub fn evidence_for(
    source_id: &str,
    subject_ref: &str,
    predicate: &str,
    object_ref: &str,
    confidence: f64,
) -> Evidence {
    Evidence {
        source_id: source_id.to_string(),
        predicate: predicate.to_string(),
        subject_ref: subject_ref.to_string(),
        object_ref: object_ref.to_string(),
        extraction_confidence: Confidence::new(confidence),
        raw_confidence: Confidence::new(confidence),
        degradation_factors: Vec::new(),
        temporal_context: None,
        caveats: Vec::new(),
        polarity: Polarity::Supports,
    }
}

/// Refuting evidence for `(ref-a influenced ref-b)`.
pub fn refuting_evidence(source_id: &str, confidence: f64) -> Evidence {
    Evidence {
        polarity: Polarity::Refutes,
        ..evidence(source_id, confidence)
    }
}

pub fn with_caveats(mut evidence: Evidence, caveats: &[&str]) -> Evidence {
    evidence.caveats = caveats.iter().map(|c| (*c).to_string()).collect();
    evidence
}

/// The three-source worked example: 0.88 ("builds on"), 0.82 ("credits as
/// influence"), 0.95 (citation share).
pub fn worked_example_evidence() -> Vec<Evidence> {
    vec![
        with_caveats(evidence("ev-builds-on", 0.88), &["builds on prior work"]),
        with_caveats(evidence("ev-credits", 0.82), &["credits as influence"]),
        with_caveats(evidence("ev-citations", 0.95), &["citation share 47/204"]),
    ]
}

pub fn ocr_chain() -> Vec<DegradationFactor> {
    vec![
        DegradationFactor::new("ocr", 0.95),
        DegradationFactor::new("chunking", 0.98),
    ]
}

/// Absolute-tolerance float comparison for assertions.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

// ── Estimator double ─────────────────────────────────────────────────────

/// Deterministic [`IEstimator`]: answers each schema name with a scripted
/// estimate and counts calls. Unscripted schemas fail.
#[derive(Default)]
pub struct ScriptedEstimator {
    responses: Mutex<BTreeMap<String, Estimate>>,
    calls: AtomicUsize,
}

impl ScriptedEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answer for `schema_name`.
    pub fn respond(self, schema_name: &str, values: &[(&str, f64)]) -> Self {
        let estimate = Estimate {
            values: values
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect(),
            rationale: format!("scripted response for {schema_name}"),
        };
        self.responses
            .lock()
            .unwrap()
            .insert(schema_name.to_string(), estimate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IEstimator for ScriptedEstimator {
    fn estimate(&self, _prompt: &str, schema: &EstimateSchema) -> CredenceResult<Estimate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(&schema.name)
            .cloned()
            .ok_or_else(|| {
                AggregationError::EstimatorFailed {
                    estimator: self.name().to_string(),
                    message: format!("no scripted response for schema '{}'", schema.name),
                }
                .into()
            })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
