//! Entity resolver tests: cue updates, constraint propagation, retroactive
//! chain resolution, conflicts, and finalization.

use credence_core::config::ResolutionConfig;
use credence_core::errors::{CredenceErrorCode, ResolutionError};
use credence_core::models::{
    CandidateProbability, ConstraintKind, EntityReference, ReferenceConstraint, ResolutionStatus,
};
use credence_core::trace::TraceComponent;
use credence_core::ReasoningTrace;
use credence_resolution::{
    resolve_scope, Cue, CueEvent, ReasoningTag, ReferenceOutcome, ScopeEvent, ScopeInput,
    ScopeResolver,
};
use test_fixtures::approx_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TAJFEL: &str = "e-tajfel";
const TURNER: &str = "e-turner";
const BROWN: &str = "e-brown";

fn resolver() -> ScopeResolver {
    ScopeResolver::new("doc-1/speaker-1", [TAJFEL, TURNER, BROWN], &ResolutionConfig::default())
        .unwrap()
}

fn reference(ref_id: &str) -> EntityReference {
    EntityReference::new(ref_id, format!("mention {ref_id}"), "doc-1", "speaker-1")
}

fn self_id(ref_id: &str, entity: &str) -> CueEvent {
    CueEvent::new(
        ref_id,
        format!("I, {entity}, ..."),
        Cue::SelfIdentification {
            entity_id: entity.to_string(),
        },
    )
}

fn associative(ref_id: &str, entity: &str) -> CueEvent {
    CueEvent::new(
        ref_id,
        "mentioned alongside",
        Cue::Associative {
            entity_id: entity.to_string(),
            strength: 1.0,
        },
    )
}

fn same_as(target: &str) -> ReferenceConstraint {
    ReferenceConstraint {
        kind: ConstraintKind::SameAs,
        target_ref_id: target.to_string(),
    }
}

fn different_from(target: &str) -> ReferenceConstraint {
    ReferenceConstraint {
        kind: ConstraintKind::DifferentFrom,
        target_ref_id: target.to_string(),
    }
}

fn status(r: &ScopeResolver, ref_id: &str) -> ResolutionStatus {
    r.reference(ref_id).unwrap().status
}

// ---------------------------------------------------------------------------
// Cue updates
// ---------------------------------------------------------------------------

#[test]
fn prior_is_uniform_over_candidates_and_unknown() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    let d = r.distribution("r1").unwrap();
    assert!(approx_eq(d.probability_of(TAJFEL), 0.25, 1e-12));
    assert!(approx_eq(d.unknown, 0.25, 1e-12));
    assert_eq!(status(&r, "r1"), ResolutionStatus::Unresolved);
    assert_eq!(r.audit()[0].reasoning, ReasoningTag::InitialPrior);
}

#[test]
fn self_identification_resolves_near_deterministically() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.observe(&self_id("r1", TAJFEL)).unwrap();

    // 0.98 / (0.98 + 3 × 0.02)
    let p = r.distribution("r1").unwrap().probability_of(TAJFEL);
    assert!(approx_eq(p, 0.98 / 1.04, 1e-9));
    assert_eq!(status(&r, "r1"), ResolutionStatus::Resolved);
    assert_eq!(r.resolved_entity("r1"), Some(TAJFEL));

    let step = r.audit().last().unwrap();
    assert_eq!(step.reasoning, ReasoningTag::SelfIdentification);
    assert!(approx_eq(step.prior.probability_of(TAJFEL), 0.25, 1e-12));
    assert!(step.evidence_text.contains(TAJFEL));
}

#[test]
fn associative_cues_move_status_monotonically() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();

    r.observe(&associative("r1", TURNER)).unwrap();
    assert_eq!(status(&r, "r1"), ResolutionStatus::PartiallyResolved);
    r.observe(&associative("r1", TURNER)).unwrap();
    assert_eq!(status(&r, "r1"), ResolutionStatus::PartiallyResolved);
    assert!(approx_eq(
        r.distribution("r1").unwrap().probability_of(TURNER),
        16.0 / 19.0,
        1e-9
    ));
    r.observe(&associative("r1", TURNER)).unwrap();
    assert_eq!(status(&r, "r1"), ResolutionStatus::Resolved);
    assert_eq!(r.resolved_entity("r1"), Some(TURNER));
}

#[test]
fn cues_after_resolution_are_recorded_not_applied() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.observe(&self_id("r1", TAJFEL)).unwrap();
    let before = r.distribution("r1").unwrap().clone();

    r.observe(&self_id("r1", TURNER)).unwrap();
    assert_eq!(r.distribution("r1").unwrap(), &before);
    assert_eq!(r.resolved_entity("r1"), Some(TAJFEL));
    assert_eq!(
        r.audit().last().unwrap().reasoning,
        ReasoningTag::IgnoredAfterResolution
    );
}

#[test]
fn oppositional_cue_waits_for_resolved_in_group() {
    let mut r = resolver();
    r.register(reference("r-us")).unwrap();
    r.register(reference("r-them")).unwrap();
    let cue = CueEvent::new(
        "r-them",
        "unlike us, they ...",
        Cue::Oppositional {
            in_group_ref: "r-us".to_string(),
        },
    );

    r.observe(&cue).unwrap();
    assert_eq!(
        r.audit().last().unwrap().reasoning,
        ReasoningTag::OppositionalInGroupUnresolved
    );
    assert!(approx_eq(
        r.distribution("r-them").unwrap().probability_of(TAJFEL),
        0.25,
        1e-12
    ));

    r.observe(&self_id("r-us", TAJFEL)).unwrap();
    r.observe(&cue).unwrap();
    let d = r.distribution("r-them").unwrap();
    // 0.25 × 0.35 against 0.25 × 1.0 for the other two candidates and Unknown.
    assert!(approx_eq(d.probability_of(TAJFEL), 0.0875 / 0.8375, 1e-9));
    assert!(d.probability_of(TURNER) > 0.25);
    assert_eq!(status(&r, "r-them"), ResolutionStatus::Unresolved);
}

#[test]
fn neutral_cue_changes_nothing() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    let before = r.distribution("r1").unwrap().clone();
    r.observe(&CueEvent::new("r1", "they said", Cue::Neutral)).unwrap();
    assert_eq!(r.distribution("r1").unwrap(), &before);
    assert_eq!(r.audit().last().unwrap().reasoning, ReasoningTag::Neutral);
}

// ---------------------------------------------------------------------------
// Constraint propagation
// ---------------------------------------------------------------------------

#[test]
fn same_as_resolved_reference_copies_distribution() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.register(reference("r2")).unwrap();
    r.observe(&self_id("r1", TAJFEL)).unwrap();

    r.constrain("r2", &same_as("r1")).unwrap();
    assert_eq!(r.distribution("r2"), r.distribution("r1"));
    assert_eq!(status(&r, "r2"), ResolutionStatus::Resolved);

    let revision = r.revisions().last().unwrap();
    assert_eq!(revision.ref_id, "r2");
    assert_eq!(revision.triggered_by, "r1");
    assert_eq!(revision.original_status, ResolutionStatus::Unresolved);
    assert!(approx_eq(revision.original.probability_of(TAJFEL), 0.25, 1e-12));
    assert!(r
        .audit()
        .iter()
        .any(|s| s.ref_id == "r2" && s.reasoning == ReasoningTag::SameAsCopy));
}

#[test]
fn same_as_unresolved_target_is_deferred_until_it_resolves() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.register(reference("r2")).unwrap();

    r.constrain("r2", &same_as("r1")).unwrap();
    assert_eq!(status(&r, "r2"), ResolutionStatus::Unresolved);
    assert_eq!(
        r.audit().last().unwrap().reasoning,
        ReasoningTag::ConstraintDeferred
    );

    r.observe(&self_id("r1", TURNER)).unwrap();
    assert_eq!(r.resolved_entity("r2"), Some(TURNER));
    assert_eq!(r.revisions().len(), 1);
}

#[test]
fn different_from_resolved_reference_zeroes_and_renormalizes() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.register(reference("r2")).unwrap();
    r.observe(&self_id("r1", TAJFEL)).unwrap();

    r.constrain("r2", &different_from("r1")).unwrap();
    let d = r.distribution("r2").unwrap();
    assert_eq!(d.probability_of(TAJFEL), 0.0);
    assert!(approx_eq(d.probability_of(TURNER), 1.0 / 3.0, 1e-12));
    assert!(approx_eq(d.mass(), 1.0, 1e-12));
}

#[test]
fn different_from_is_applied_when_target_resolves_later() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.register(reference("r2")).unwrap();
    r.constrain("r2", &different_from("r1")).unwrap();
    assert!(approx_eq(
        r.distribution("r2").unwrap().probability_of(BROWN),
        0.25,
        1e-12
    ));

    r.observe(&self_id("r1", BROWN)).unwrap();
    assert_eq!(r.distribution("r2").unwrap().probability_of(BROWN), 0.0);
}

#[test]
fn declared_constraints_wait_for_their_target() {
    let mut r = resolver();
    r.register(reference("r2").same_as("r1")).unwrap();
    r.register(reference("r1")).unwrap();
    r.observe(&self_id("r1", TAJFEL)).unwrap();
    assert_eq!(r.resolved_entity("r2"), Some(TAJFEL));
}

// ---------------------------------------------------------------------------
// Retroactive chain resolution
// ---------------------------------------------------------------------------

#[test]
fn chain_resolution_propagates_backward_and_keeps_originals() {
    let mut r = resolver();
    r.register(reference("r1").in_chain("c1")).unwrap();
    r.register(reference("r2").in_chain("c1")).unwrap();
    r.register(reference("r3").in_chain("c1")).unwrap();

    r.observe(&associative("r1", TURNER)).unwrap();
    assert_eq!(status(&r, "r1"), ResolutionStatus::PartiallyResolved);

    r.observe(&self_id("r3", TURNER)).unwrap();
    for id in ["r1", "r2", "r3"] {
        assert_eq!(r.resolved_entity(id), Some(TURNER), "{id}");
    }

    let revisions = r.revisions();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].ref_id, "r1");
    assert_eq!(revisions[0].triggered_by, "r3");
    assert_eq!(revisions[0].original_status, ResolutionStatus::PartiallyResolved);
    assert!(approx_eq(
        revisions[0].original.probability_of(TURNER),
        0.2 / 0.35,
        1e-9
    ));
    assert_eq!(revisions[1].ref_id, "r2");
    assert!(r
        .audit()
        .iter()
        .any(|s| s.ref_id == "r2" && s.reasoning == ReasoningTag::ChainPropagation));
}

#[test]
fn later_chain_member_inherits_resolution() {
    let mut r = resolver();
    r.register(reference("r1").in_chain("c1")).unwrap();
    r.observe(&self_id("r1", BROWN)).unwrap();
    r.register(reference("r4").in_chain("c1")).unwrap();
    assert_eq!(r.resolved_entity("r4"), Some(BROWN));
}

#[test]
fn chain_members_resolved_differently_conflict_on_join() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.register(reference("r2")).unwrap();
    r.observe(&self_id("r1", TAJFEL)).unwrap();
    r.observe(&self_id("r2", TURNER)).unwrap();

    let err = r.constrain("r2", &same_as("r1")).unwrap_err();
    assert!(matches!(err, ResolutionError::ConstraintConflict { .. }));
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

#[test]
fn same_as_plus_different_from_on_same_pair_is_a_conflict() {
    let mut r = resolver();
    r.register(reference("ref_A")).unwrap();
    r.register(reference("ref_B")).unwrap();
    r.constrain("ref_A", &same_as("ref_B")).unwrap();

    let err = r.constrain("ref_A", &different_from("ref_B")).unwrap_err();
    assert_eq!(err.error_code(), "CONSTRAINT_CONFLICT");
    match err {
        ResolutionError::ConstraintConflict {
            ref_id,
            target_ref_id,
            ..
        } => {
            assert_eq!(ref_id, "ref_A");
            assert_eq!(target_ref_id, "ref_B");
        }
        other => panic!("unexpected error: {other}"),
    }
    // No auto-picked resolution: neither reference resolved.
    assert!(r.resolved_entity("ref_A").is_none());
    assert!(r.resolved_entity("ref_B").is_none());
}

#[test]
fn declared_contradiction_fails_whole_scope() {
    let input = ScopeInput {
        scope: "doc-2".to_string(),
        candidates: vec![TAJFEL.to_string(), TURNER.to_string()],
        references: vec![
            reference("ref_B"),
            reference("ref_A").same_as("ref_B").different_from("ref_B"),
        ],
        events: Vec::new(),
    };
    let err = resolve_scope(&input, &ResolutionConfig::default()).unwrap_err();
    assert!(matches!(err, ResolutionError::ConstraintConflict { .. }));
}

#[test]
fn conflicted_scope_refuses_further_work() {
    let mut r = resolver();
    r.register(reference("a")).unwrap();
    r.register(reference("b")).unwrap();
    r.constrain("a", &different_from("b")).unwrap();
    assert!(r.constrain("a", &same_as("b")).is_err());

    let err = r.observe(&self_id("a", TAJFEL)).unwrap_err();
    assert!(matches!(err, ResolutionError::ConstraintConflict { .. }));
    assert!(r.finalize().is_err());
}

#[test]
fn different_from_pair_resolving_to_same_entity_conflicts() {
    let mut r = resolver();
    r.register(reference("a")).unwrap();
    r.register(reference("b")).unwrap();
    r.observe(&self_id("a", TAJFEL)).unwrap();
    r.observe(&self_id("b", TAJFEL)).unwrap();
    let err = r.constrain("a", &different_from("b")).unwrap_err();
    assert!(matches!(err, ResolutionError::ConstraintConflict { .. }));
}

#[test]
fn self_difference_is_a_conflict() {
    let mut r = resolver();
    r.register(reference("a")).unwrap();
    assert!(r.constrain("a", &different_from("a")).is_err());
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[test]
fn rejects_bad_input() {
    assert!(matches!(
        ScopeResolver::new("s", Vec::<String>::new(), &ResolutionConfig::default()),
        Err(ResolutionError::EmptyCandidateSet { .. })
    ));

    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    assert!(matches!(
        r.register(reference("r1")),
        Err(ResolutionError::DuplicateReference { .. })
    ));
    assert!(matches!(
        r.observe(&self_id("nope", TAJFEL)),
        Err(ResolutionError::UnknownReference { .. })
    ));
    assert!(matches!(
        r.observe(&self_id("r1", "e-nobody")),
        Err(ResolutionError::UnknownCandidate { .. })
    ));
    let bad_strength = CueEvent::new(
        "r1",
        "x",
        Cue::Associative {
            entity_id: TAJFEL.to_string(),
            strength: 1.5,
        },
    );
    assert!(matches!(
        r.observe(&bad_strength),
        Err(ResolutionError::InvalidCue { .. })
    ));
}

#[test]
fn seeded_distribution_must_not_exceed_one() {
    let mut r = resolver();
    let mut seeded = reference("r1");
    seeded.candidates = vec![
        CandidateProbability {
            entity_id: TAJFEL.to_string(),
            probability: 0.7,
        },
        CandidateProbability {
            entity_id: TURNER.to_string(),
            probability: 0.6,
        },
    ];
    assert!(matches!(
        r.register(seeded),
        Err(ResolutionError::InvalidDistribution { .. })
    ));
}

#[test]
fn seeded_distribution_keeps_residual_as_unknown() {
    let mut r = resolver();
    let mut seeded = reference("r1");
    seeded.candidates = vec![CandidateProbability {
        entity_id: TAJFEL.to_string(),
        probability: 0.6,
    }];
    r.register(seeded).unwrap();
    let d = r.distribution("r1").unwrap();
    assert!(approx_eq(d.unknown, 0.4, 1e-12));
    assert_eq!(status(&r, "r1"), ResolutionStatus::PartiallyResolved);
}

// ---------------------------------------------------------------------------
// Finalization
// ---------------------------------------------------------------------------

#[test]
fn finalize_marks_every_reference_stable() {
    let mut r = resolver();
    r.register(reference("r1")).unwrap();
    r.register(reference("r2")).unwrap();
    r.observe(&self_id("r1", TAJFEL)).unwrap();
    r.observe(&associative("r2", BROWN)).unwrap();

    let resolution = r.finalize().unwrap();
    assert_eq!(resolution.entity_for("r1"), Some(TAJFEL));
    match resolution.outcome("r2").unwrap() {
        ReferenceOutcome::TerminalUnresolved {
            status,
            best_candidate,
        } => {
            assert_eq!(*status, ResolutionStatus::PartiallyResolved);
            assert_eq!(best_candidate.as_ref().unwrap().entity_id, BROWN);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(resolution.canonical_entity("r2").as_deref(), Some("unresolved:r2"));
    assert_eq!(resolution.canonical_entity("r1").as_deref(), Some(TAJFEL));
    assert!(resolution.canonical_entity("r9").is_none());

    assert!(matches!(
        r.observe(&self_id("r2", BROWN)),
        Err(ResolutionError::ScopeFinalized { .. })
    ));
}

#[test]
fn resolve_scope_replays_events_in_order() {
    let input = ScopeInput {
        scope: "doc-3".to_string(),
        candidates: vec![TAJFEL.to_string(), TURNER.to_string(), BROWN.to_string()],
        references: vec![
            reference("r1").in_chain("c"),
            reference("r2").in_chain("c"),
            reference("r3"),
        ],
        events: vec![
            ScopeEvent::Constraint {
                ref_id: "r3".to_string(),
                constraint: different_from("r1"),
            },
            ScopeEvent::Cue(self_id("r2", TURNER)),
        ],
    };
    let resolution = resolve_scope(&input, &ResolutionConfig::default()).unwrap();
    assert_eq!(resolution.entity_for("r1"), Some(TURNER));
    let r3 = resolution.get("r3").unwrap();
    assert_eq!(
        r3.reference
            .candidates
            .iter()
            .find(|c| c.entity_id == TURNER)
            .unwrap()
            .probability,
        0.0
    );
    assert!(r3.reference.is_well_formed());
}

#[test]
fn record_into_appends_resolver_entries() {
    let mut r = resolver();
    r.register(reference("r1").in_chain("c")).unwrap();
    r.register(reference("r2").in_chain("c")).unwrap();
    r.observe(&self_id("r2", TAJFEL)).unwrap();
    let resolution = r.finalize().unwrap();

    let mut trace = ReasoningTrace::new();
    resolution.record_into(&mut trace);
    assert_eq!(
        trace.len(),
        resolution.audit.len() + resolution.revisions.len()
    );
    assert!(trace
        .entries()
        .iter()
        .all(|e| e.component == TraceComponent::Resolver));
    assert_eq!(trace.entries_for("r1").filter(|e| e.operation == "revision").count(), 1);
}
