//! Group normalized evidence into claims by resolved (subject, predicate, object).

use std::collections::BTreeMap;

use tracing::debug;

use credence_core::errors::{CredenceResult, ResolutionError};
use credence_core::models::{ClaimKey, Evidence};
use credence_resolution::ScopeResolution;

/// Map each evidence item to the claim its resolved references point at.
///
/// References that stayed unresolved map to `unresolved:<ref_id>`, so they
/// never merge with a resolved entity. A reference absent from every scope
/// is an error. Evidence order within each group is preserved.
pub fn group_evidence(
    evidence: &[Evidence],
    resolutions: &[ScopeResolution],
) -> CredenceResult<BTreeMap<ClaimKey, Vec<Evidence>>> {
    let mut groups: BTreeMap<ClaimKey, Vec<Evidence>> = BTreeMap::new();
    for item in evidence {
        let subject = canonical(&item.subject_ref, resolutions)?;
        let object = canonical(&item.object_ref, resolutions)?;
        let key = ClaimKey::new(subject, item.predicate.clone(), object);
        groups.entry(key).or_default().push(item.clone());
    }
    debug!(
        evidence = evidence.len(),
        claims = groups.len(),
        "grouped evidence into claims"
    );
    Ok(groups)
}

fn canonical(ref_id: &str, resolutions: &[ScopeResolution]) -> CredenceResult<String> {
    resolutions
        .iter()
        .find_map(|resolution| resolution.canonical_entity(ref_id))
        .ok_or_else(|| {
            let scopes: Vec<&str> = resolutions.iter().map(|r| r.scope.as_str()).collect();
            ResolutionError::UnknownReference {
                ref_id: ref_id.to_string(),
                scope: scopes.join(","),
            }
            .into()
        })
}
