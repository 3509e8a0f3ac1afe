//! Property tests for per-claim lineage restriction.

use std::collections::BTreeSet;

use credence_core::models::DependencyDescriptor;
use credence_pipeline::restrict_dependencies;
use proptest::prelude::*;

const IDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn descriptor(edges: &[(usize, usize)], groups: &[Vec<usize>]) -> DependencyDescriptor {
    let mut deps = DependencyDescriptor::with_coefficient(0.6);
    for (from, to) in edges {
        deps = deps.derived(IDS[*from], IDS[*to], 0.5);
    }
    for members in groups {
        deps = deps.group(members.iter().map(|m| IDS[*m]), 0.4);
    }
    deps
}

proptest! {
    #[test]
    fn restriction_never_leaves_the_claim(
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..10),
        groups in prop::collection::vec(prop::collection::vec(0usize..6, 2..5), 0..4),
        keep in prop::collection::btree_set(0usize..6, 0..6),
    ) {
        let deps = descriptor(&edges, &groups);
        let ids: BTreeSet<&str> = keep.iter().map(|i| IDS[*i]).collect();
        let restricted = restrict_dependencies(&deps, &ids);

        for d in &restricted.depends_on {
            prop_assert!(ids.contains(d.evidence_id.as_str()));
            prop_assert!(ids.contains(d.depends_on.as_str()));
        }
        for g in &restricted.groups {
            prop_assert!(g.members.len() >= 2);
            prop_assert!(g.members.iter().all(|m| ids.contains(m.as_str())));
        }
        prop_assert_eq!(restricted.independence_coefficient, deps.independence_coefficient);
    }

    #[test]
    fn restriction_to_every_id_is_identity(
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..10),
        groups in prop::collection::vec(prop::collection::vec(0usize..6, 2..5), 0..4),
    ) {
        let deps = descriptor(&edges, &groups);
        let ids: BTreeSet<&str> = IDS.into_iter().collect();
        prop_assert_eq!(restrict_dependencies(&deps, &ids), deps);
    }
}
