//! Finalized output of one resolution scope.

use serde::{Deserialize, Serialize};
use serde_json::json;

use credence_core::constants::UNRESOLVED_ENTITY_PREFIX;
use credence_core::models::{CandidateProbability, EntityReference, ResolutionStatus};
use credence_core::trace::{ReasoningTrace, TraceComponent};

use crate::audit::{Revision, UpdateStep};

/// Stable end state of a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReferenceOutcome {
    Resolved {
        entity_id: String,
        probability: f64,
    },
    /// Explicitly left unresolved when the scope closed.
    TerminalUnresolved {
        status: ResolutionStatus,
        best_candidate: Option<CandidateProbability>,
    },
}

impl ReferenceOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub reference: EntityReference,
    pub outcome: ReferenceOutcome,
}

/// Everything a closed scope produced. References are in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeResolution {
    pub scope: String,
    pub references: Vec<ResolvedReference>,
    pub audit: Vec<UpdateStep>,
    pub revisions: Vec<Revision>,
}

impl ScopeResolution {
    pub fn get(&self, ref_id: &str) -> Option<&ResolvedReference> {
        self.references.iter().find(|r| r.reference.ref_id == ref_id)
    }

    pub fn outcome(&self, ref_id: &str) -> Option<&ReferenceOutcome> {
        self.get(ref_id).map(|r| &r.outcome)
    }

    /// Entity id for a resolved reference.
    pub fn entity_for(&self, ref_id: &str) -> Option<&str> {
        match self.outcome(ref_id)? {
            ReferenceOutcome::Resolved { entity_id, .. } => Some(entity_id.as_str()),
            ReferenceOutcome::TerminalUnresolved { .. } => None,
        }
    }

    /// Identifier a claim uses for this reference: the entity id when
    /// resolved, `unresolved:<ref_id>` otherwise. `None` if the reference is
    /// not part of this scope.
    pub fn canonical_entity(&self, ref_id: &str) -> Option<String> {
        self.outcome(ref_id).map(|outcome| match outcome {
            ReferenceOutcome::Resolved { entity_id, .. } => entity_id.clone(),
            ReferenceOutcome::TerminalUnresolved { .. } => {
                format!("{UNRESOLVED_ENTITY_PREFIX}{ref_id}")
            }
        })
    }

    pub fn revisions_for<'a>(&'a self, ref_id: &'a str) -> impl Iterator<Item = &'a Revision> + 'a {
        self.revisions.iter().filter(move |r| r.ref_id == ref_id)
    }

    /// Append the audit steps and revisions to a run trace.
    pub fn record_into(&self, trace: &mut ReasoningTrace) {
        for step in &self.audit {
            trace.record(
                TraceComponent::Resolver,
                "update",
                &step.ref_id,
                json!({
                    "scope": self.scope,
                    "evidence_text": step.evidence_text,
                    "prior": step.prior,
                    "posterior": step.posterior,
                    "status": step.status,
                    "reasoning": step.reasoning,
                }),
            );
        }
        for revision in &self.revisions {
            trace.record(
                TraceComponent::Resolver,
                "revision",
                &revision.ref_id,
                json!({
                    "scope": self.scope,
                    "original": revision.original,
                    "original_status": revision.original_status,
                    "updated": revision.updated,
                    "triggered_by": revision.triggered_by,
                }),
            );
        }
    }
}
