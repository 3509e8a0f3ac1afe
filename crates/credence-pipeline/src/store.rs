//! In-memory claim store.

use dashmap::DashMap;
use tracing::debug;

use credence_core::errors::{CredenceResult, PipelineError};
use credence_core::models::Claim;
use credence_core::traits::IClaimSink;

/// Concurrent [`IClaimSink`] keyed by claim id.
///
/// A commit replaces the stored claim as one value; readers see either the
/// previous claim or the new one, never a mix.
#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    claims: DashMap<String, Claim>,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Claim ids in sorted order.
    pub fn claim_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.claims.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Stored claim or `ClaimNotFound`.
    pub fn require(&self, claim_id: &str) -> CredenceResult<Claim> {
        self.get(claim_id).ok_or_else(|| {
            PipelineError::ClaimNotFound {
                claim_id: claim_id.to_string(),
            }
            .into()
        })
    }

    /// Every stored claim, ordered by claim id.
    pub fn snapshot(&self) -> Vec<Claim> {
        let mut claims: Vec<Claim> = self.claims.iter().map(|e| e.value().clone()).collect();
        claims.sort_by(|a, b| a.claim_id.cmp(&b.claim_id));
        claims
    }
}

impl IClaimSink for MemoryClaimStore {
    fn commit(&self, claim: Claim) -> CredenceResult<()> {
        debug!(
            claim_id = %claim.claim_id,
            epochs = claim.epochs.len(),
            "committing claim"
        );
        self.claims.insert(claim.claim_id.clone(), claim);
        Ok(())
    }

    fn get(&self, claim_id: &str) -> Option<Claim> {
        self.claims.get(claim_id).map(|e| e.value().clone())
    }
}
