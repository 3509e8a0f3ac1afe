use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dependency::DependencyDescriptor;

/// Subject / predicate / object of a claim after entity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimKey {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl ClaimKey {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Deterministic claim id: blake3 over the unit-separated key.
    pub fn claim_id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.subject.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(self.predicate.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(self.object.as_bytes());
        let hex = hasher.finalize().to_hex();
        format!("claim-{}", &hex[..32])
    }
}

impl std::fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

/// Why a confidence epoch was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpochReason {
    Initial,
    EntityResolved { ref_id: String },
    EvidenceChanged,
    Recalibrated { note: String },
}

/// One confidence computation. Epochs are append-only; earlier values are never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceEpoch {
    pub epoch: u32,
    pub prior: f64,
    pub posterior: f64,
    pub meta_confidence: f64,
    pub adjusted_confidence: f64,
    pub reason: EpochReason,
    pub computed_at: DateTime<Utc>,
}

/// An aggregated, entity-resolved statement with one posterior confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub subject_entity: String,
    pub predicate: String,
    pub object_entity: String,
    pub evidence_refs: Vec<String>,
    pub dependency_graph: DependencyDescriptor,
    /// Posterior of the latest epoch.
    pub posterior_confidence: f64,
    /// Meta-confidence of the latest epoch.
    pub meta_confidence: f64,
    /// `posterior_confidence × meta_confidence` of the latest epoch.
    pub adjusted_confidence: f64,
    pub epochs: Vec<ConfidenceEpoch>,
}

impl Claim {
    pub fn key(&self) -> ClaimKey {
        ClaimKey::new(&self.subject_entity, &self.predicate, &self.object_entity)
    }

    pub fn current_epoch(&self) -> Option<&ConfidenceEpoch> {
        self.epochs.last()
    }

    /// Append a new confidence epoch, keeping the claim id and all prior epochs.
    pub fn with_epoch(
        mut self,
        prior: f64,
        posterior: f64,
        meta_confidence: f64,
        reason: EpochReason,
    ) -> Self {
        let epoch = self.epochs.len() as u32;
        let adjusted_confidence = posterior * meta_confidence;
        self.epochs.push(ConfidenceEpoch {
            epoch,
            prior,
            posterior,
            meta_confidence,
            adjusted_confidence,
            reason,
            computed_at: Utc::now(),
        });
        self.posterior_confidence = posterior;
        self.meta_confidence = meta_confidence;
        self.adjusted_confidence = adjusted_confidence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_id_is_deterministic_and_key_sensitive() {
        let a = ClaimKey::new("e1", "influenced", "e2");
        let b = ClaimKey::new("e1", "influenced", "e2");
        let c = ClaimKey::new("e2", "influenced", "e1");
        assert_eq!(a.claim_id(), b.claim_id());
        assert_ne!(a.claim_id(), c.claim_id());
        assert!(a.claim_id().starts_with("claim-"));
    }
}
