use serde::{Deserialize, Serialize};

use crate::constants::PROBABILITY_EPSILON;

/// Resolution status. Ordered so that transitions can be checked for monotonicity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    #[default]
    Unresolved,
    PartiallyResolved,
    Resolved,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::PartiallyResolved => "partially_resolved",
            Self::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProbability {
    pub entity_id: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    SameAs,
    DifferentFrom,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceConstraint {
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    pub target_ref_id: String,
}

/// A textual mention that may denote one of several canonical entities.
///
/// Only the entity resolver mutates these. Candidate probabilities sum to at
/// most 1; the residual is the Unknown bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReference {
    pub ref_id: String,
    pub surface_text: String,
    pub document_id: String,
    pub speaker_or_source: String,
    /// Coreference chain assigned upstream, if any.
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub status: ResolutionStatus,
    #[serde(default)]
    pub candidates: Vec<CandidateProbability>,
    #[serde(default)]
    pub constraints: Vec<ReferenceConstraint>,
}

impl EntityReference {
    pub fn new(
        ref_id: impl Into<String>,
        surface_text: impl Into<String>,
        document_id: impl Into<String>,
        speaker_or_source: impl Into<String>,
    ) -> Self {
        Self {
            ref_id: ref_id.into(),
            surface_text: surface_text.into(),
            document_id: document_id.into(),
            speaker_or_source: speaker_or_source.into(),
            chain_id: None,
            status: ResolutionStatus::Unresolved,
            candidates: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn in_chain(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    pub fn same_as(mut self, target_ref_id: impl Into<String>) -> Self {
        self.constraints.push(ReferenceConstraint {
            kind: ConstraintKind::SameAs,
            target_ref_id: target_ref_id.into(),
        });
        self
    }

    pub fn different_from(mut self, target_ref_id: impl Into<String>) -> Self {
        self.constraints.push(ReferenceConstraint {
            kind: ConstraintKind::DifferentFrom,
            target_ref_id: target_ref_id.into(),
        });
        self
    }

    /// Highest-probability candidate. Ties go to the lexicographically smaller id.
    pub fn top_candidate(&self) -> Option<&CandidateProbability> {
        self.candidates.iter().fold(None, |best, c| match best {
            None => Some(c),
            Some(b) if c.probability > b.probability => Some(c),
            Some(b) if c.probability == b.probability && c.entity_id < b.entity_id => Some(c),
            Some(b) => Some(b),
        })
    }

    pub fn probability_of(&self, entity_id: &str) -> f64 {
        self.candidates
            .iter()
            .find(|c| c.entity_id == entity_id)
            .map(|c| c.probability)
            .unwrap_or(0.0)
    }

    /// Mass not assigned to any candidate.
    pub fn unknown_mass(&self) -> f64 {
        let assigned: f64 = self.candidates.iter().map(|c| c.probability).sum();
        (1.0 - assigned).max(0.0)
    }

    /// Whether candidate probabilities respect the ≤ 1 invariant.
    pub fn is_well_formed(&self) -> bool {
        let assigned: f64 = self.candidates.iter().map(|c| c.probability).sum();
        self.candidates
            .iter()
            .all(|c| c.probability >= 0.0 && c.probability.is_finite())
            && assigned <= 1.0 + PROBABILITY_EPSILON
    }
}
