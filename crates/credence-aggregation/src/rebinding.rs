//! Retroactive claim updates for references that resolve after their claims
//! were scored.

use serde::{Deserialize, Serialize};

use credence_core::constants::UNRESOLVED_ENTITY_PREFIX;
use credence_core::models::Claim;
use credence_resolution::{ReferenceOutcome, ScopeResolution};

/// A reference that claims were grouped under as `unresolved:<ref_id>` and
/// that now names an entity.
///
/// Only placeholders are rebound: the placeholder belongs to one reference,
/// so every claim carrying it owes that endpoint to this reference alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityResolution {
    pub ref_id: String,
    /// Endpoint the affected claims carry today.
    pub previous: String,
    pub entity_id: String,
}

impl EntityResolution {
    pub fn from_unresolved(ref_id: impl Into<String>, entity_id: impl Into<String>) -> Self {
        let ref_id = ref_id.into();
        Self {
            previous: format!("{UNRESOLVED_ENTITY_PREFIX}{ref_id}"),
            ref_id,
            entity_id: entity_id.into(),
        }
    }

    /// References left unresolved in `before` that `after` resolves, in
    /// `after`'s arrival order.
    pub fn between(before: &ScopeResolution, after: &ScopeResolution) -> Vec<Self> {
        after
            .references
            .iter()
            .filter_map(|r| {
                let ref_id = r.reference.ref_id.as_str();
                let was_unresolved = matches!(
                    before.outcome(ref_id),
                    Some(ReferenceOutcome::TerminalUnresolved { .. })
                );
                match &r.outcome {
                    ReferenceOutcome::Resolved { entity_id, .. } if was_unresolved => {
                        Some(Self::from_unresolved(ref_id, entity_id.as_str()))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    pub fn affects(&self, claim: &Claim) -> bool {
        claim.subject_entity == self.previous || claim.object_entity == self.previous
    }

    pub fn affected<'a>(&self, claims: &'a [Claim]) -> Vec<&'a Claim> {
        claims.iter().filter(|c| self.affects(c)).collect()
    }

    /// The claim with every endpoint equal to `previous` replaced. The claim
    /// id and epochs are untouched.
    pub fn rebind(&self, mut claim: Claim) -> Claim {
        if claim.subject_entity == self.previous {
            claim.subject_entity = self.entity_id.clone();
        }
        if claim.object_entity == self.previous {
            claim.object_entity = self.entity_id.clone();
        }
        claim
    }
}
