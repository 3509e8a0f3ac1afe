use crate::errors::CredenceResult;
use crate::models::Claim;

/// Destination for finalized claims. Called only after a claim has been
/// fully computed; partial state never reaches a sink.
pub trait IClaimSink: Send + Sync {
    fn commit(&self, claim: Claim) -> CredenceResult<()>;

    fn get(&self, claim_id: &str) -> Option<Claim>;
}
