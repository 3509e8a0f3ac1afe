//! Audit records: ordered update steps and retroactive revisions.

use serde::{Deserialize, Serialize};

use credence_core::models::ResolutionStatus;

use crate::distribution::Distribution;

/// Why a distribution changed (or deliberately did not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningTag {
    InitialPrior,
    SelfIdentification,
    Oppositional,
    /// Oppositional cue whose in-group reference is not resolved yet; no update.
    OppositionalInGroupUnresolved,
    Associative,
    Neutral,
    /// Cue arrived after the reference resolved; recorded, not applied.
    IgnoredAfterResolution,
    SameAsCopy,
    DifferentFromExclusion,
    /// Constraint recorded against an unresolved target; applied when it resolves.
    ConstraintDeferred,
    ChainPropagation,
}

/// One ordered update to one reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStep {
    pub seq: u64,
    pub ref_id: String,
    pub evidence_text: String,
    pub prior: Distribution,
    pub posterior: Distribution,
    pub status: ResolutionStatus,
    pub reasoning: ReasoningTag,
}

/// A retroactive change to an earlier reference, keeping the replaced value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub ref_id: String,
    pub original: Distribution,
    pub original_status: ResolutionStatus,
    pub updated: Distribution,
    /// The reference whose resolution caused this revision.
    pub triggered_by: String,
}
