//! Property tests for confidence values, claim ids, and confidence epochs.

use credence_core::models::{Claim, ClaimKey, DependencyDescriptor, EpochReason};
use credence_core::Confidence;
use proptest::prelude::*;

fn empty_claim(key: &ClaimKey) -> Claim {
    Claim {
        claim_id: key.claim_id(),
        subject_entity: key.subject.clone(),
        predicate: key.predicate.clone(),
        object_entity: key.object.clone(),
        evidence_refs: Vec::new(),
        dependency_graph: DependencyDescriptor::independent(),
        posterior_confidence: 0.0,
        meta_confidence: 0.0,
        adjusted_confidence: 0.0,
        epochs: Vec::new(),
    }
}

proptest! {
    #[test]
    fn confidence_always_lands_in_unit_interval(value in proptest::num::f64::ANY) {
        let c = Confidence::new(value).value();
        prop_assert!((0.0..=1.0).contains(&c));
        match Confidence::checked(value) {
            Some(checked) => prop_assert_eq!(checked.value(), value),
            None => prop_assert!(!value.is_finite() || !(0.0..=1.0).contains(&value)),
        }
    }

    #[test]
    fn claim_id_is_deterministic_and_separates_fields(
        subject in "[a-z-]{1,8}",
        predicate in "[a-z_]{1,8}",
        object in "[a-z-]{1,8}",
    ) {
        let key = ClaimKey::new(&subject, &predicate, &object);
        prop_assert_eq!(key.claim_id(), key.clone().claim_id());

        let shifted = ClaimKey::new(format!("{subject}{predicate}"), "", &object);
        prop_assert_ne!(key.claim_id(), shifted.claim_id());
    }

    #[test]
    fn epochs_are_append_only(
        steps in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0), 1..6),
    ) {
        let key = ClaimKey::new("e-a", "influenced", "e-b");
        let mut claim = empty_claim(&key);
        for (i, (prior, posterior, meta)) in steps.iter().enumerate() {
            let before = claim.epochs.clone();
            let reason = if i == 0 { EpochReason::Initial } else { EpochReason::EvidenceChanged };
            claim = claim.with_epoch(*prior, *posterior, *meta, reason);

            prop_assert_eq!(&claim.epochs[..before.len()], &before[..]);
            prop_assert_eq!(claim.epochs.len(), i + 1);
            prop_assert_eq!(claim.epochs[i].epoch as usize, i);
            prop_assert_eq!(&claim.claim_id, &key.claim_id());
            prop_assert!(claim.adjusted_confidence <= claim.posterior_confidence);
            prop_assert_eq!(claim.posterior_confidence, *posterior);
        }
    }
}
