//! Property tests for dependency-aware aggregation.

use std::sync::Arc;

use credence_aggregation::{
    AggregationRequest, DependencyAwareAggregator, FixedMetaConfidence, PriorSource,
};
use credence_core::config::AggregationConfig;
use credence_core::models::{ClaimKey, DependencyDescriptor, Evidence};
use proptest::prelude::*;
use test_fixtures::evidence;

fn items(confidences: &[f64]) -> Vec<Evidence> {
    confidences
        .iter()
        .enumerate()
        .map(|(i, c)| evidence(&format!("e{i}"), *c))
        .collect()
}

fn request(ev: Vec<Evidence>, deps: DependencyDescriptor, prior: f64) -> AggregationRequest {
    AggregationRequest::new(
        ClaimKey::new("e-a", "influenced", "e-b"),
        ev,
        deps,
        PriorSource::supplied(prior),
    )
}

proptest! {
    #[test]
    fn independent_joint_is_product_of_marginals(
        confidences in prop::collection::vec(0.05f64..0.99, 1..8),
        prior in 0.01f64..0.99,
    ) {
        let b = DependencyAwareAggregator::new(&AggregationConfig::default())
            .compute(&request(items(&confidences), DependencyDescriptor::independent(), prior))
            .unwrap();
        let product: f64 = b.items.iter().map(|i| i.given_h).product();
        prop_assert!((b.joint_given_h - product).abs() <= 1e-9 * product.max(1e-300));
        prop_assert!((b.effective_evidence - confidences.len() as f64).abs() < 1e-12);
    }

    #[test]
    fn full_restatement_never_changes_the_posterior(
        confidences in prop::collection::vec(0.05f64..0.99, 1..6),
        coefficient in 0.0f64..=1.0,
        prior in 0.01f64..0.99,
    ) {
        let agg = DependencyAwareAggregator::new(&AggregationConfig::default());
        let deps = DependencyDescriptor::with_coefficient(coefficient);
        let base = agg
            .compute(&request(items(&confidences), deps.clone(), prior))
            .unwrap();

        let mut ev = items(&confidences);
        ev.push(evidence("restated", confidences[0]));
        let with_copy = agg
            .compute(&request(ev, deps.derived("restated", "e0", 1.0), prior))
            .unwrap();

        prop_assert!((with_copy.posterior - base.posterior).abs() < 1e-12);
    }

    #[test]
    fn correlated_restatement_never_raises_the_posterior(
        confidences in prop::collection::vec(0.05f64..0.99, 1..6),
        original in 0usize..6,
        restated in 0.05f64..0.99,
        coefficient in 0.0f64..=1.0,
        prior in 0.01f64..0.99,
    ) {
        let agg = DependencyAwareAggregator::new(&AggregationConfig::default());
        let deps = DependencyDescriptor::with_coefficient(coefficient);
        let base = agg
            .compute(&request(items(&confidences), deps.clone(), prior))
            .unwrap();

        let original = format!("e{}", original % confidences.len());
        let mut ev = items(&confidences);
        ev.push(evidence("restated", restated));
        let with_copy = agg
            .compute(&request(ev, deps.group([original.as_str(), "restated"], 1.0), prior))
            .unwrap();

        prop_assert!(with_copy.posterior <= base.posterior + 1e-12);
        prop_assert!((with_copy.posterior - base.posterior).abs() < 1e-12);
    }

    #[test]
    fn adjusted_never_exceeds_posterior(
        confidences in prop::collection::vec(0.0f64..=1.0, 1..6),
        coefficient in 0.0f64..=1.0,
        meta in 0.0f64..=1.0,
        prior in 0.0f64..=1.0,
    ) {
        let b = DependencyAwareAggregator::new(&AggregationConfig::default())
            .with_meta_confidence(Arc::new(FixedMetaConfidence(meta)))
            .compute(&request(
                items(&confidences),
                DependencyDescriptor::with_coefficient(coefficient),
                prior,
            ))
            .unwrap();
        prop_assert!((0.0..=1.0).contains(&b.posterior));
        prop_assert!(b.adjusted_confidence <= b.posterior + 1e-15);
        prop_assert!(b.adjusted_confidence >= 0.0);
    }
}
