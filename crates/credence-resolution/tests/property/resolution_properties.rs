//! Property tests for credence-resolution: replay idempotence, the
//! probability-mass invariant, and monotone status.

use std::collections::BTreeMap;

use proptest::prelude::*;

use credence_core::config::ResolutionConfig;
use credence_core::models::{ConstraintKind, EntityReference, ReferenceConstraint};
use credence_resolution::{resolve_scope, Cue, CueEvent, ScopeEvent, ScopeInput};

const CANDIDATES: [&str; 3] = ["e1", "e2", "e3"];
const REFS: [&str; 4] = ["r0", "r1", "r2", "r3"];

fn event_strategy() -> impl Strategy<Value = ScopeEvent> {
    prop_oneof![
        (0..4usize, 0..3usize).prop_map(|(r, e)| ScopeEvent::Cue(CueEvent::new(
            REFS[r],
            "self",
            Cue::SelfIdentification {
                entity_id: CANDIDATES[e].to_string()
            }
        ))),
        (0..4usize, 0..3usize, 0.0f64..=1.0).prop_map(|(r, e, s)| ScopeEvent::Cue(
            CueEvent::new(
                REFS[r],
                "assoc",
                Cue::Associative {
                    entity_id: CANDIDATES[e].to_string(),
                    strength: s
                }
            )
        )),
        (0..4usize, 0..4usize).prop_map(|(r, g)| ScopeEvent::Cue(CueEvent::new(
            REFS[r],
            "opp",
            Cue::Oppositional {
                in_group_ref: REFS[g].to_string()
            }
        ))),
        (0..4usize, 0..4usize, any::<bool>()).prop_map(|(r, t, same)| ScopeEvent::Constraint {
            ref_id: REFS[r].to_string(),
            constraint: ReferenceConstraint {
                kind: if same {
                    ConstraintKind::SameAs
                } else {
                    ConstraintKind::DifferentFrom
                },
                target_ref_id: REFS[t].to_string(),
            },
        }),
    ]
}

fn input_strategy() -> impl Strategy<Value = ScopeInput> {
    (
        prop::collection::vec(prop::option::of(0..2usize), 4),
        prop::collection::vec(event_strategy(), 0..16),
    )
        .prop_map(|(chains, events)| ScopeInput {
            scope: "prop-scope".to_string(),
            candidates: CANDIDATES.iter().map(|c| c.to_string()).collect(),
            references: REFS
                .iter()
                .zip(chains)
                .map(|(id, chain)| {
                    let r = EntityReference::new(*id, *id, "doc", "speaker");
                    match chain {
                        Some(c) => r.in_chain(format!("c{c}")),
                        None => r,
                    }
                })
                .collect(),
            events,
        })
}

proptest! {
    #[test]
    fn resolving_twice_gives_identical_output(input in input_strategy()) {
        let config = ResolutionConfig::default();
        let first = resolve_scope(&input, &config);
        let second = resolve_scope(&input, &config);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a.is_ok(), b.is_ok()),
        }
    }

    #[test]
    fn candidate_mass_never_exceeds_one(input in input_strategy()) {
        if let Ok(resolution) = resolve_scope(&input, &ResolutionConfig::default()) {
            for r in &resolution.references {
                prop_assert!(r.reference.is_well_formed());
            }
            for step in &resolution.audit {
                prop_assert!((step.posterior.mass() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn status_never_regresses(input in input_strategy()) {
        if let Ok(resolution) = resolve_scope(&input, &ResolutionConfig::default()) {
            let mut last = BTreeMap::new();
            for step in &resolution.audit {
                if let Some(previous) = last.insert(step.ref_id.clone(), step.status) {
                    prop_assert!(step.status >= previous);
                }
            }
        }
    }
}
