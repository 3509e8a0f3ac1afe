use serde::{Deserialize, Serialize};

use super::theory::StrengthLevel;

/// Theory placement of a claim, as exported to the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryContext {
    pub theory_id: String,
    pub strength_level: StrengthLevel,
    pub fit_confidence: f64,
    pub constructs: Vec<String>,
    pub hypotheses_supported: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSummary {
    pub count: usize,
    pub supporting: usize,
    pub refuting: usize,
    pub source_ids: Vec<String>,
    pub mean_raw_confidence: f64,
}

/// Finalized claim plus theory fit, as one record for the knowledge-graph collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraphRecord {
    pub claim_id: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f64,
    pub confidence_type: String,
    pub theory_context: Option<TheoryContext>,
    pub evidence_summary: EvidenceSummary,
    pub audit_trail_ref: String,
}
