//! ScopeResolver: resolution state for one document/speaker scope.
//!
//! Status transitions are monotone. A resolved reference is frozen: later
//! cues are recorded but not applied, and only a contradiction can touch it,
//! which fails the scope.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, info, instrument, warn};

use credence_core::config::ResolutionConfig;
use credence_core::errors::ResolutionError;
use credence_core::models::{
    ConstraintKind, EntityReference, ReferenceConstraint, ResolutionStatus,
};

use crate::audit::{ReasoningTag, Revision, UpdateStep};
use crate::chain::ChainIndex;
use crate::cue::{self, Cue, CueEvent, ScopeEvent};
use crate::distribution::Distribution;
use crate::outcome::{ReferenceOutcome, ResolvedReference, ScopeResolution};

#[derive(Debug, Clone)]
struct RefState {
    reference: EntityReference,
    dist: Distribution,
    /// Set exactly once, when the reference reaches `Resolved`.
    entity: Option<String>,
}

#[derive(Debug, Clone)]
struct Conflict {
    ref_id: String,
    target_ref_id: String,
    reason: String,
}

type Pair = (String, String);

fn pair(a: &str, b: &str) -> Pair {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Sequential Bayesian resolver over a fixed candidate set.
pub struct ScopeResolver {
    scope: String,
    config: ResolutionConfig,
    candidates: BTreeSet<String>,
    refs: BTreeMap<String, RefState>,
    arrival: BTreeMap<String, usize>,
    order: Vec<String>,
    chains: ChainIndex,
    /// Upstream chain id → first reference registered with it.
    upstream_chains: BTreeMap<String, String>,
    same_pairs: BTreeSet<Pair>,
    different_pairs: BTreeSet<Pair>,
    /// Declared constraints whose target is not registered yet, keyed by target.
    pending: BTreeMap<String, Vec<(String, ConstraintKind)>>,
    audit: Vec<UpdateStep>,
    revisions: Vec<Revision>,
    conflict: Option<Conflict>,
    finalized: bool,
}

impl ScopeResolver {
    pub fn new<I, S>(
        scope: impl Into<String>,
        candidates: I,
        config: &ResolutionConfig,
    ) -> Result<Self, ResolutionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scope = scope.into();
        let candidates: BTreeSet<String> = candidates.into_iter().map(Into::into).collect();
        if candidates.is_empty() {
            return Err(ResolutionError::EmptyCandidateSet { scope });
        }
        Ok(Self {
            scope,
            config: config.clone(),
            candidates,
            refs: BTreeMap::new(),
            arrival: BTreeMap::new(),
            order: Vec::new(),
            chains: ChainIndex::default(),
            upstream_chains: BTreeMap::new(),
            same_pairs: BTreeSet::new(),
            different_pairs: BTreeSet::new(),
            pending: BTreeMap::new(),
            audit: Vec::new(),
            revisions: Vec::new(),
            conflict: None,
            finalized: false,
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn candidates(&self) -> &BTreeSet<String> {
        &self.candidates
    }

    pub fn reference(&self, ref_id: &str) -> Option<&EntityReference> {
        self.refs.get(ref_id).map(|s| &s.reference)
    }

    pub fn distribution(&self, ref_id: &str) -> Option<&Distribution> {
        self.refs.get(ref_id).map(|s| &s.dist)
    }

    /// The entity a reference resolved to, if it has.
    pub fn resolved_entity(&self, ref_id: &str) -> Option<&str> {
        self.refs.get(ref_id).and_then(|s| s.entity.as_deref())
    }

    pub fn audit(&self) -> &[UpdateStep] {
        &self.audit
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Add a reference to the scope. Its own candidate list, if any, seeds
    /// the prior; otherwise the prior is uniform over candidates and Unknown.
    /// Declared constraints against references not yet seen wait for them.
    pub fn register(&mut self, reference: EntityReference) -> Result<(), ResolutionError> {
        self.check_live()?;
        let ref_id = reference.ref_id.clone();
        if self.refs.contains_key(&ref_id) {
            return Err(ResolutionError::DuplicateReference {
                ref_id,
                scope: self.scope.clone(),
            });
        }

        let prior = if reference.candidates.is_empty() {
            Distribution::uniform(&self.candidates)
        } else {
            Distribution::from_candidates(&reference.candidates, &self.candidates).map_err(
                |reason| ResolutionError::InvalidDistribution {
                    ref_id: ref_id.clone(),
                    reason,
                },
            )?
        };
        let declared = reference.constraints.clone();
        let chain_id = reference.chain_id.clone();

        let mut state = RefState {
            reference,
            dist: prior.clone(),
            entity: None,
        };
        state.reference.status = ResolutionStatus::Unresolved;
        self.arrival.insert(ref_id.clone(), self.order.len());
        self.order.push(ref_id.clone());
        self.refs.insert(ref_id.clone(), state);
        self.chains.insert(&ref_id);
        debug!(scope = %self.scope, ref_id = %ref_id, "registered reference");

        let mut queue = VecDeque::new();
        self.apply_distribution(
            &ref_id,
            prior,
            String::new(),
            ReasoningTag::InitialPrior,
            None,
            &mut queue,
        );

        if let Some(chain_id) = chain_id {
            match self.upstream_chains.get(&chain_id).cloned() {
                Some(first) => self.join(&first, &ref_id, &mut queue)?,
                None => {
                    self.upstream_chains.insert(chain_id, ref_id.clone());
                }
            }
        }

        for constraint in declared {
            if self.refs.contains_key(&constraint.target_ref_id) {
                self.apply_constraint(
                    &ref_id,
                    constraint.kind,
                    &constraint.target_ref_id,
                    &mut queue,
                )?;
            } else {
                self.pending
                    .entry(constraint.target_ref_id.clone())
                    .or_default()
                    .push((ref_id.clone(), constraint.kind));
            }
        }
        if let Some(waiting) = self.pending.remove(&ref_id) {
            for (source, kind) in waiting {
                self.apply_constraint(&source, kind, &ref_id, &mut queue)?;
            }
        }

        self.settle(queue)
    }

    /// Apply one textual cue to a reference.
    #[instrument(skip(self, event), fields(scope = %self.scope, ref_id = %event.ref_id))]
    pub fn observe(&mut self, event: &CueEvent) -> Result<(), ResolutionError> {
        self.check_live()?;
        let ref_id = event.ref_id.as_str();
        let (current, frozen) = match self.refs.get(ref_id) {
            Some(state) => (state.dist.clone(), state.entity.is_some()),
            None => return Err(self.unknown_reference(ref_id)),
        };

        if frozen {
            self.push_step(
                ref_id,
                &event.evidence_text,
                current.clone(),
                current,
                ReasoningTag::IgnoredAfterResolution,
            );
            return Ok(());
        }

        let (tag, in_group) = match &event.cue {
            Cue::SelfIdentification { entity_id } => {
                self.require_candidate(entity_id)?;
                (ReasoningTag::SelfIdentification, None)
            }
            Cue::Associative {
                entity_id,
                strength,
            } => {
                self.require_candidate(entity_id)?;
                if !(0.0..=1.0).contains(strength) {
                    return Err(ResolutionError::InvalidCue {
                        ref_id: ref_id.to_string(),
                        reason: format!("associative strength {strength} outside [0, 1]"),
                    });
                }
                (ReasoningTag::Associative, None)
            }
            Cue::Oppositional { in_group_ref } => {
                if !self.refs.contains_key(in_group_ref) {
                    return Err(self.unknown_reference(in_group_ref));
                }
                match self.entity_of(in_group_ref) {
                    Some(group) => (ReasoningTag::Oppositional, Some(group)),
                    None => {
                        self.push_step(
                            ref_id,
                            &event.evidence_text,
                            current.clone(),
                            current,
                            ReasoningTag::OppositionalInGroupUnresolved,
                        );
                        return Ok(());
                    }
                }
            }
            Cue::Neutral => {
                self.push_step(
                    ref_id,
                    &event.evidence_text,
                    current.clone(),
                    current,
                    ReasoningTag::Neutral,
                );
                return Ok(());
            }
        };

        let config = &self.config;
        let next = current
            .update(|candidate| cue::likelihood(config, &event.cue, in_group.as_deref(), candidate))
            .ok_or_else(|| ResolutionError::InvalidCue {
                ref_id: ref_id.to_string(),
                reason: format!("{} cue leaves no probability mass", event.cue.kind()),
            })?;
        debug!(
            scope = %self.scope,
            ref_id = %ref_id,
            cue = event.cue.kind(),
            top = next.top().map(|(_, p)| p).unwrap_or(0.0),
            "applied cue"
        );

        let mut queue = VecDeque::new();
        self.apply_distribution(
            ref_id,
            next,
            event.evidence_text.clone(),
            tag,
            None,
            &mut queue,
        );
        self.settle(queue)
    }

    /// Add a constraint between two registered references.
    pub fn constrain(
        &mut self,
        ref_id: &str,
        constraint: &ReferenceConstraint,
    ) -> Result<(), ResolutionError> {
        self.check_live()?;
        for id in [ref_id, constraint.target_ref_id.as_str()] {
            if !self.refs.contains_key(id) {
                return Err(self.unknown_reference(id));
            }
        }
        let mut queue = VecDeque::new();
        self.apply_constraint(ref_id, constraint.kind, &constraint.target_ref_id, &mut queue)?;
        self.settle(queue)
    }

    pub fn apply(&mut self, event: &ScopeEvent) -> Result<(), ResolutionError> {
        match event {
            ScopeEvent::Cue(cue) => self.observe(cue),
            ScopeEvent::Constraint { ref_id, constraint } => self.constrain(ref_id, constraint),
        }
    }

    /// Close the scope. Every reference becomes either resolved or
    /// terminal-unresolved; no further updates are accepted.
    #[instrument(skip(self), fields(scope = %self.scope))]
    pub fn finalize(&mut self) -> Result<ScopeResolution, ResolutionError> {
        self.check_live()?;
        self.finalized = true;

        let references: Vec<ResolvedReference> = self
            .order
            .iter()
            .filter_map(|id| self.refs.get(id))
            .map(|state| {
                let outcome = match &state.entity {
                    Some(entity_id) => ReferenceOutcome::Resolved {
                        entity_id: entity_id.clone(),
                        probability: state.dist.probability_of(entity_id),
                    },
                    None => ReferenceOutcome::TerminalUnresolved {
                        status: state.reference.status,
                        best_candidate: state.reference.top_candidate().cloned(),
                    },
                };
                ResolvedReference {
                    reference: state.reference.clone(),
                    outcome,
                }
            })
            .collect();

        let resolved = references.iter().filter(|r| r.outcome.is_resolved()).count();
        info!(
            scope = %self.scope,
            references = references.len(),
            resolved,
            revisions = self.revisions.len(),
            "finalized resolution scope"
        );

        Ok(ScopeResolution {
            scope: self.scope.clone(),
            references,
            audit: self.audit.clone(),
            revisions: self.revisions.clone(),
        })
    }

    // ── Constraint handling ──────────────────────────────────────────────

    fn apply_constraint(
        &mut self,
        source: &str,
        kind: ConstraintKind,
        target: &str,
        queue: &mut VecDeque<String>,
    ) -> Result<(), ResolutionError> {
        if let Some(state) = self.refs.get_mut(source) {
            let constraint = ReferenceConstraint {
                kind,
                target_ref_id: target.to_string(),
            };
            if !state.reference.constraints.contains(&constraint) {
                state.reference.constraints.push(constraint);
            }
        }

        match kind {
            ConstraintKind::SameAs => {
                if source == target {
                    return Ok(());
                }
                if self.different_pairs.contains(&pair(source, target)) {
                    return Err(self.fail(
                        source,
                        target,
                        "same_as and different_from declared for the same pair".to_string(),
                    ));
                }
                self.same_pairs.insert(pair(source, target));
                self.join(source, target, queue)?;

                match (self.entity_of(source), self.entity_of(target)) {
                    (None, Some(_)) => {
                        self.copy_from(target, source, ReasoningTag::SameAsCopy, queue)
                    }
                    (Some(_), None) => {
                        self.copy_from(source, target, ReasoningTag::SameAsCopy, queue)
                    }
                    (None, None) => self.note_deferred(source, target, kind),
                    (Some(_), Some(_)) => {}
                }
                Ok(())
            }
            ConstraintKind::DifferentFrom => {
                if source == target {
                    return Err(self.fail(
                        source,
                        target,
                        "reference declared different from itself".to_string(),
                    ));
                }
                if self.same_pairs.contains(&pair(source, target))
                    || self.chains.same(source, target)
                {
                    return Err(self.fail(
                        source,
                        target,
                        "same_as and different_from declared for the same pair".to_string(),
                    ));
                }
                self.different_pairs.insert(pair(source, target));

                match (self.chain_entity(source), self.chain_entity(target)) {
                    (Some(a), Some(b)) if a == b => Err(self.fail(
                        source,
                        target,
                        format!("different_from pair both resolve to '{a}'"),
                    )),
                    (Some(_), Some(_)) => Ok(()),
                    (None, Some(entity)) => self.exclude_chain(source, &entity, target, queue),
                    (Some(entity), None) => self.exclude_chain(target, &entity, source, queue),
                    (None, None) => {
                        self.note_deferred(source, target, kind);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Merge two chains after checking that doing so contradicts nothing.
    fn join(
        &mut self,
        a: &str,
        b: &str,
        queue: &mut VecDeque<String>,
    ) -> Result<(), ResolutionError> {
        if self.chains.same(a, b) {
            return Ok(());
        }
        if let (Some(x), Some(y)) = (self.chain_entity(a), self.chain_entity(b)) {
            if x != y {
                return Err(self.fail(
                    a,
                    b,
                    format!("same_as joins chains resolved to '{x}' and '{y}'"),
                ));
            }
        }
        let left = self.chains.members(a);
        let right = self.chains.members(b);
        for x in &left {
            for y in &right {
                if self.different_pairs.contains(&pair(x, y)) {
                    return Err(self.fail(
                        x,
                        y,
                        "same_as and different_from declared for the same pair".to_string(),
                    ));
                }
            }
        }

        self.chains.union(a, b, &self.arrival);
        if let Some(member) = self.chain_resolved_member(a) {
            queue.push_back(member);
        }
        Ok(())
    }

    /// Zero `entity` for every unresolved member of `ref_id`'s chain.
    fn exclude_chain(
        &mut self,
        ref_id: &str,
        entity: &str,
        triggered_by: &str,
        queue: &mut VecDeque<String>,
    ) -> Result<(), ResolutionError> {
        for member in self.chains.members(ref_id) {
            let Some(state) = self.refs.get(&member) else {
                continue;
            };
            if state.entity.is_some() {
                continue;
            }
            let Some(next) = state.dist.exclude(entity) else {
                return Err(self.fail(
                    &member,
                    triggered_by,
                    format!("excluding '{entity}' leaves no probability mass"),
                ));
            };
            self.apply_distribution(
                &member,
                next,
                format!("different_from {triggered_by}"),
                ReasoningTag::DifferentFromExclusion,
                None,
                queue,
            );
        }
        Ok(())
    }

    /// Propagate every newly resolved reference through its chain and its
    /// `different_from` partners until nothing changes.
    fn settle(&mut self, mut queue: VecDeque<String>) -> Result<(), ResolutionError> {
        while let Some(resolved) = queue.pop_front() {
            let Some(entity) = self.entity_of(&resolved) else {
                continue;
            };

            for member in self.chains.members(&resolved) {
                if member == resolved {
                    continue;
                }
                match self.entity_of(&member) {
                    Some(existing) if existing == entity => {}
                    Some(existing) => {
                        return Err(self.fail(
                            &member,
                            &resolved,
                            format!(
                                "chain member already resolved to '{existing}', propagation would set '{entity}'"
                            ),
                        ))
                    }
                    None => {
                        self.copy_from(&resolved, &member, ReasoningTag::ChainPropagation, &mut queue)
                    }
                }
            }

            let partners: Vec<String> = self
                .different_pairs
                .iter()
                .filter_map(|(a, b)| {
                    if *a == resolved {
                        Some(b.clone())
                    } else if *b == resolved {
                        Some(a.clone())
                    } else {
                        None
                    }
                })
                .collect();
            for partner in partners {
                match self.chain_entity(&partner) {
                    Some(other) if other == entity => {
                        return Err(self.fail(
                            &resolved,
                            &partner,
                            format!("different_from pair both resolve to '{entity}'"),
                        ))
                    }
                    Some(_) => {}
                    None => self.exclude_chain(&partner, &entity, &resolved, &mut queue)?,
                }
            }
        }
        Ok(())
    }

    // ── State updates ────────────────────────────────────────────────────

    /// Retroactively give `target` the distribution of resolved `source`,
    /// keeping the replaced value as a revision.
    fn copy_from(
        &mut self,
        source: &str,
        target: &str,
        tag: ReasoningTag,
        queue: &mut VecDeque<String>,
    ) {
        let (Some(src), Some(dst)) = (self.refs.get(source), self.refs.get(target)) else {
            return;
        };
        let Some(entity) = src.entity.clone() else {
            return;
        };
        let updated = src.dist.clone();
        self.revisions.push(Revision {
            ref_id: target.to_string(),
            original: dst.dist.clone(),
            original_status: dst.reference.status,
            updated: updated.clone(),
            triggered_by: source.to_string(),
        });
        debug!(
            scope = %self.scope,
            ref_id = %target,
            triggered_by = %source,
            entity = %entity,
            "retroactive resolution"
        );
        self.apply_distribution(
            target,
            updated,
            format!("resolved via {source}"),
            tag,
            Some(&entity),
            queue,
        );
    }

    /// Install a new distribution, record the step, and enqueue the reference
    /// if it just resolved. `resolve_to` forces resolution to a known entity.
    fn apply_distribution(
        &mut self,
        ref_id: &str,
        next: Distribution,
        evidence_text: String,
        reasoning: ReasoningTag,
        resolve_to: Option<&str>,
        queue: &mut VecDeque<String>,
    ) {
        let computed = match resolve_to {
            Some(_) => ResolutionStatus::Resolved,
            None => self.status_for(&next),
        };
        let Some(state) = self.refs.get_mut(ref_id) else {
            return;
        };
        let prior = std::mem::replace(&mut state.dist, next);
        state.reference.candidates = state.dist.to_candidates();
        state.reference.status = state.reference.status.max(computed);

        let newly_resolved =
            state.reference.status == ResolutionStatus::Resolved && state.entity.is_none();
        if newly_resolved {
            state.entity = match resolve_to {
                Some(entity) => Some(entity.to_string()),
                None => state.dist.top().map(|(id, _)| id.to_string()),
            };
        }

        self.audit.push(UpdateStep {
            seq: self.audit.len() as u64,
            ref_id: ref_id.to_string(),
            evidence_text,
            prior,
            posterior: state.dist.clone(),
            status: state.reference.status,
            reasoning,
        });

        if newly_resolved {
            info!(
                scope = %self.scope,
                ref_id = %ref_id,
                entity = state.entity.as_deref().unwrap_or_default(),
                "reference resolved"
            );
            queue.push_back(ref_id.to_string());
        }
    }

    fn push_step(
        &mut self,
        ref_id: &str,
        evidence_text: &str,
        prior: Distribution,
        posterior: Distribution,
        reasoning: ReasoningTag,
    ) {
        let status = self
            .refs
            .get(ref_id)
            .map(|s| s.reference.status)
            .unwrap_or_default();
        self.audit.push(UpdateStep {
            seq: self.audit.len() as u64,
            ref_id: ref_id.to_string(),
            evidence_text: evidence_text.to_string(),
            prior,
            posterior,
            status,
            reasoning,
        });
    }

    fn note_deferred(&mut self, source: &str, target: &str, kind: ConstraintKind) {
        let Some(current) = self.refs.get(source).map(|s| s.dist.clone()) else {
            return;
        };
        let verb = match kind {
            ConstraintKind::SameAs => "same_as",
            ConstraintKind::DifferentFrom => "different_from",
        };
        self.push_step(
            source,
            &format!("{verb} {target}"),
            current.clone(),
            current,
            ReasoningTag::ConstraintDeferred,
        );
    }

    // ── Queries ──────────────────────────────────────────────────────────

    fn status_for(&self, dist: &Distribution) -> ResolutionStatus {
        match dist.top() {
            Some((_, p)) if p >= self.config.resolution_threshold => ResolutionStatus::Resolved,
            Some((_, p)) if p >= self.config.partial_threshold => {
                ResolutionStatus::PartiallyResolved
            }
            _ => ResolutionStatus::Unresolved,
        }
    }

    fn entity_of(&self, ref_id: &str) -> Option<String> {
        self.refs.get(ref_id).and_then(|s| s.entity.clone())
    }

    /// Entity of the first resolved member of `ref_id`'s chain.
    fn chain_entity(&self, ref_id: &str) -> Option<String> {
        self.chain_resolved_member(ref_id)
            .and_then(|member| self.entity_of(&member))
    }

    fn chain_resolved_member(&self, ref_id: &str) -> Option<String> {
        self.chains
            .members(ref_id)
            .into_iter()
            .find(|m| self.entity_of(m).is_some())
    }

    fn require_candidate(&self, entity_id: &str) -> Result<(), ResolutionError> {
        if self.candidates.contains(entity_id) {
            Ok(())
        } else {
            Err(ResolutionError::UnknownCandidate {
                entity_id: entity_id.to_string(),
                scope: self.scope.clone(),
            })
        }
    }

    fn unknown_reference(&self, ref_id: &str) -> ResolutionError {
        ResolutionError::UnknownReference {
            ref_id: ref_id.to_string(),
            scope: self.scope.clone(),
        }
    }

    fn check_live(&self) -> Result<(), ResolutionError> {
        if let Some(c) = &self.conflict {
            return Err(ResolutionError::ConstraintConflict {
                ref_id: c.ref_id.clone(),
                target_ref_id: c.target_ref_id.clone(),
                reason: c.reason.clone(),
            });
        }
        if self.finalized {
            return Err(ResolutionError::ScopeFinalized {
                scope: self.scope.clone(),
            });
        }
        Ok(())
    }

    /// Record a conflict. The scope refuses all further work afterwards.
    fn fail(&mut self, ref_id: &str, target_ref_id: &str, reason: String) -> ResolutionError {
        warn!(
            scope = %self.scope,
            ref_id = %ref_id,
            target_ref_id = %target_ref_id,
            reason = %reason,
            "constraint conflict"
        );
        self.conflict = Some(Conflict {
            ref_id: ref_id.to_string(),
            target_ref_id: target_ref_id.to_string(),
            reason: reason.clone(),
        });
        ResolutionError::ConstraintConflict {
            ref_id: ref_id.to_string(),
            target_ref_id: target_ref_id.to_string(),
            reason,
        }
    }
}
