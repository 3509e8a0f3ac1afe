//! CredencePipeline: bounded tokio worker pool over resolution scopes and claims.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::json;
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use credence_aggregation::{
    group_evidence, AggregationRequest, DependencyAwareAggregator, EntityResolution, PriorSource,
};
use credence_core::config::CredenceConfig;
use credence_core::errors::{CredenceError, CredenceResult, PipelineError, ResolutionError};
use credence_core::models::{
    Claim, ClaimKey, DependencyDescriptor, Evidence, Format, Representation, TheorySchema,
};
use credence_core::trace::{ReasoningTrace, TraceComponent};
use credence_core::traits::IClaimSink;
use credence_crossmodal::{claims_to_graph, CrossModalValidator};
use credence_normalizer::{DegradationChain, EvidenceNormalizer};
use credence_observability::pipeline_span;
use credence_resolution::{resolve_scope, ScopeInput, ScopeResolution};
use credence_theory::TheoryFitAssessor;

use crate::barrier::StabilityBarrier;
use crate::export::knowledge_graph_record;
use crate::plan::{restrict_dependencies, ClaimFailure, ClaimReport, PipelineInput, PipelineOutput};

/// Shared, read-only context of the claim workers.
struct ClaimContext {
    aggregator: Arc<DependencyAwareAggregator>,
    assessor: Arc<TheoryFitAssessor>,
    sink: Arc<dyn IClaimSink>,
    dependencies: DependencyDescriptor,
    prior: PriorSource,
    notes: Vec<String>,
    theory: Option<TheorySchema>,
    run_id: Uuid,
}

type ScopeOutcome = (usize, ScopeResolution, ReasoningTrace);
type ClaimOutcome = (usize, ClaimKey, CredenceResult<ClaimReport>, ReasoningTrace);

/// Runs normalization, one resolution task per scope, and one aggregation
/// task per claim, with at most `pipeline.max_concurrency` tasks working at
/// once.
///
/// Claim tasks start only after every entity reference in the evidence is
/// stable. A claim reaches the sink only after its aggregation and theory
/// fit both succeeded and every scope of the run finalized without error;
/// cancelled or aborted tasks commit nothing.
pub struct CredencePipeline {
    config: CredenceConfig,
    normalizer: EvidenceNormalizer,
    aggregator: Arc<DependencyAwareAggregator>,
    assessor: Arc<TheoryFitAssessor>,
    validator: CrossModalValidator,
    sink: Arc<dyn IClaimSink>,
    permits: Arc<Semaphore>,
    cancel: watch::Sender<bool>,
}

impl CredencePipeline {
    pub fn new(config: CredenceConfig, sink: Arc<dyn IClaimSink>) -> CredenceResult<Self> {
        config.validate()?;
        let normalizer = EvidenceNormalizer::new(&config.normalizer)?;
        let (cancel, _rx) = watch::channel(false);
        Ok(Self {
            normalizer,
            aggregator: Arc::new(DependencyAwareAggregator::new(&config.aggregation)),
            assessor: Arc::new(TheoryFitAssessor::new(&config.theory)),
            validator: CrossModalValidator::new(&config.crossmodal),
            sink,
            permits: Arc::new(Semaphore::new(config.pipeline.max_concurrency)),
            cancel,
            config,
        })
    }

    /// Replace the aggregator, e.g. to inject an estimator or a meta-confidence strategy.
    pub fn with_aggregator(mut self, aggregator: DependencyAwareAggregator) -> Self {
        self.aggregator = Arc::new(aggregator);
        self
    }

    pub fn with_validator(mut self, validator: CrossModalValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &CredenceConfig {
        &self.config
    }

    /// Cancel in-flight and future runs. Tasks that have not committed yet
    /// stop without writing.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    pub async fn run(&self, input: PipelineInput) -> CredenceResult<PipelineOutput> {
        let trace = ReasoningTrace::new();
        let span = pipeline_span!(trace.run_id(), input.scopes.len());
        self.execute(input, trace).instrument(span).await
    }

    /// Carry late entity resolutions into claims committed by earlier runs.
    ///
    /// Every claim scored against a resolved reference's placeholder is
    /// rebound, recomputed from its own evidence under an `EntityResolved`
    /// epoch, and committed again under the same claim id. Claims no
    /// resolution touches are skipped. Returns the recommitted claims.
    pub fn apply_resolutions(
        &self,
        claims: Vec<Claim>,
        resolutions: &[EntityResolution],
        evidence: &[Evidence],
        prior: &PriorSource,
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<Vec<Claim>> {
        if self.is_cancelled() {
            return Err(PipelineError::Cancelled.into());
        }
        let mut updated = Vec::new();
        for claim in claims {
            let mut current = claim;
            let mut touched = false;
            for resolution in resolutions {
                if !resolution.affects(&current) {
                    continue;
                }
                let items: Vec<Evidence> = evidence
                    .iter()
                    .filter(|e| current.evidence_refs.contains(&e.source_id))
                    .cloned()
                    .collect();
                current = self
                    .aggregator
                    .apply_resolution(current, resolution, items, prior.clone(), Vec::new(), trace)?
                    .claim;
                touched = true;
            }
            if touched {
                self.sink.commit(current.clone())?;
                trace.record(
                    TraceComponent::Pipeline,
                    "commit",
                    current.claim_id.as_str(),
                    json!({
                        "adjusted_confidence": current.adjusted_confidence,
                        "epoch": current.epochs.len().saturating_sub(1),
                    }),
                );
                updated.push(current);
            }
        }
        info!(recommitted = updated.len(), "applied late entity resolutions");
        Ok(updated)
    }

    async fn execute(
        &self,
        input: PipelineInput,
        mut trace: ReasoningTrace,
    ) -> CredenceResult<PipelineOutput> {
        if self.is_cancelled() {
            return Err(PipelineError::Cancelled.into());
        }
        check_disjoint_scopes(&input.scopes)?;

        let run_id = trace.run_id();
        let subject = run_id.to_string();
        let evidence = self.normalize(&input, &mut trace)?;
        trace.record(
            TraceComponent::Pipeline,
            "normalize",
            subject.as_str(),
            json!({ "evidence": evidence.len() }),
        );

        let refs: BTreeSet<String> = evidence
            .iter()
            .flat_map(|e| [e.subject_ref.clone(), e.object_ref.clone()])
            .collect();
        let context = Arc::new(ClaimContext {
            aggregator: Arc::clone(&self.aggregator),
            assessor: Arc::clone(&self.assessor),
            sink: Arc::clone(&self.sink),
            dependencies: input.dependencies,
            prior: input.prior,
            notes: input.domain_notes,
            theory: input.theory,
            run_id,
        });
        let barrier = Arc::new(StabilityBarrier::new());

        let (scoped, claimed) = tokio::join!(
            self.resolve_scopes(input.scopes, Arc::clone(&barrier), run_id),
            self.aggregate_claims(&evidence, refs, context, Arc::clone(&barrier)),
        );
        let scoped = scoped?;
        let claimed = claimed?;

        let mut resolutions = Vec::with_capacity(scoped.len());
        for (_, resolution, scope_trace) in scoped {
            trace.absorb(scope_trace);
            resolutions.push(resolution);
        }

        let mut claims = Vec::new();
        let mut failures = Vec::new();
        for (_, key, result, claim_trace) in claimed {
            trace.absorb(claim_trace);
            match result {
                Ok(report) => claims.push(report),
                Err(error) => failures.push(ClaimFailure { key, error }),
            }
        }

        let cross_modal = match input.cross_modal_via {
            Some(via) => {
                let committed: Vec<_> = claims.iter().map(|c| c.claim.clone()).collect();
                let graph = Representation::Graph(claims_to_graph(&committed));
                Some(
                    self.validator
                        .inspect(&graph, &[Format::Graph, via, Format::Graph], &mut trace)?,
                )
            }
            None => None,
        };

        trace.record(
            TraceComponent::Pipeline,
            "complete",
            subject.as_str(),
            json!({
                "scopes": resolutions.len(),
                "committed": claims.len(),
                "failed": failures.len(),
            }),
        );
        info!(
            scopes = resolutions.len(),
            committed = claims.len(),
            failed = failures.len(),
            "pipeline run complete"
        );

        Ok(PipelineOutput {
            evidence,
            resolutions,
            claims,
            failures,
            cross_modal,
            trace,
        })
    }

    /// Normalize every extraction; the first malformed record fails the run.
    fn normalize(
        &self,
        input: &PipelineInput,
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<Vec<Evidence>> {
        let chain = match &input.chain {
            Some(name) => self.normalizer.chain(name)?.clone(),
            None => DegradationChain::empty(),
        };
        let mut evidence = Vec::with_capacity(input.extractions.len());
        for raw in &input.extractions {
            evidence.push(self.normalizer.normalize(raw, &chain, trace)?);
        }
        Ok(evidence)
    }

    /// One task per scope. Each finalized scope is published to the barrier;
    /// the barrier is closed once every task has finished or one has failed.
    async fn resolve_scopes(
        &self,
        scopes: Vec<ScopeInput>,
        barrier: Arc<StabilityBarrier>,
        run_id: Uuid,
    ) -> CredenceResult<Vec<ScopeOutcome>> {
        let mut tasks = JoinSet::new();
        for (idx, scope) in scopes.into_iter().enumerate() {
            let permits = Arc::clone(&self.permits);
            let cancel = self.cancel.subscribe();
            let config = self.config.resolution.clone();
            let barrier = Arc::clone(&barrier);
            tasks.spawn(async move {
                let _permit = acquire(permits, cancel.clone()).await?;
                ensure_active(&cancel)?;

                let resolution = resolve_scope(&scope, &config)?;
                let mut local = ReasoningTrace::with_run_id(run_id);
                resolution.record_into(&mut local);
                local.record(
                    TraceComponent::Pipeline,
                    "publish",
                    resolution.scope.as_str(),
                    json!({ "references": resolution.references.len() }),
                );
                barrier.publish(resolution.clone());
                Ok::<_, CredenceError>((idx, resolution, local))
            });
        }

        let mut finished = Vec::new();
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match flatten(joined, "resolve_scope") {
                Ok(outcome) => finished.push(outcome),
                Err(err) => {
                    warn!(error = %err, "resolution scope failed");
                    barrier.fail();
                    tasks.shutdown().await;
                    failure = Some(err);
                    break;
                }
            }
        }
        barrier.close();

        if let Some(err) = failure {
            return Err(err);
        }
        finished.sort_by_key(|(idx, _, _)| *idx);
        Ok(finished)
    }

    /// Wait for stability, group evidence into claims, and run one task per claim.
    async fn aggregate_claims(
        &self,
        evidence: &[Evidence],
        refs: BTreeSet<String>,
        context: Arc<ClaimContext>,
        barrier: Arc<StabilityBarrier>,
    ) -> CredenceResult<Vec<ClaimOutcome>> {
        let mut cancel = self.cancel.subscribe();
        let scopes = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return Err(PipelineError::Cancelled.into()),
            scopes = barrier.wait_for(refs) => scopes?,
        };
        let scopes: Vec<ScopeResolution> = scopes.iter().map(|s| s.as_ref().clone()).collect();
        let groups: BTreeMap<ClaimKey, Vec<Evidence>> = group_evidence(evidence, &scopes)?;
        debug!(claims = groups.len(), "evidence grouped into claims");

        let mut tasks = JoinSet::new();
        for (idx, (key, items)) in groups.into_iter().enumerate() {
            let permits = Arc::clone(&self.permits);
            let cancel = self.cancel.subscribe();
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            tasks.spawn(async move {
                let mut local = ReasoningTrace::with_run_id(context.run_id);
                let computed = match acquire(permits, cancel.clone()).await {
                    Ok(_permit) => compute_claim(&context, &key, items, &cancel, &mut local),
                    Err(err) => Err(err),
                };
                let result = match computed {
                    Ok(report) => commit_claim(&context, report, &barrier, cancel, &mut local).await,
                    Err(err) => Err(err),
                };
                (idx, key, result, local)
            });
        }

        let mut outcomes = Vec::new();
        let mut cancelled_run = false;
        let mut uncommitted = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    match &outcome.2 {
                        Err(CredenceError::Pipeline(PipelineError::Cancelled)) => {
                            cancelled_run = true;
                        }
                        Err(CredenceError::Pipeline(PipelineError::ScopesFailed { claim_id })) => {
                            uncommitted.get_or_insert_with(|| claim_id.clone());
                        }
                        _ => {}
                    }
                    outcomes.push(outcome);
                }
                Err(join_err) => {
                    tasks.shutdown().await;
                    return Err(PipelineError::TaskFailed {
                        task: "aggregate_claim".to_string(),
                        message: join_err.to_string(),
                    }
                    .into());
                }
            }
        }
        if cancelled_run {
            return Err(PipelineError::Cancelled.into());
        }
        if let Some(claim_id) = uncommitted {
            return Err(PipelineError::ScopesFailed { claim_id }.into());
        }
        outcomes.sort_by_key(|(idx, _, _, _)| *idx);
        Ok(outcomes)
    }
}

/// Compute one claim: aggregation, optional theory fit, and its export record.
/// Nothing is written to the sink here.
fn compute_claim(
    context: &ClaimContext,
    key: &ClaimKey,
    evidence: Vec<Evidence>,
    cancel: &watch::Receiver<bool>,
    trace: &mut ReasoningTrace,
) -> CredenceResult<ClaimReport> {
    ensure_active(cancel)?;

    let ids: BTreeSet<&str> = evidence.iter().map(|e| e.source_id.as_str()).collect();
    let dependencies = restrict_dependencies(&context.dependencies, &ids);
    let request = AggregationRequest::new(key.clone(), evidence, dependencies, context.prior.clone())
        .with_notes(context.notes.iter().cloned());

    let outcome = context.aggregator.aggregate(&request, trace)?;
    let theory_fit = match &context.theory {
        Some(schema) => Some(
            context
                .assessor
                .assess(&outcome.claim, &request.evidence, schema, trace)?,
        ),
        None => None,
    };
    let record = knowledge_graph_record(
        &outcome.claim,
        &request.evidence,
        theory_fit.as_ref(),
        trace,
    )?;

    Ok(ClaimReport {
        claim: outcome.claim,
        breakdown: outcome.breakdown,
        theory_fit,
        record,
    })
}

/// Commit a computed claim once every scope of the run has finalized
/// without error and the run is still active. Holds no worker permit while
/// it waits.
async fn commit_claim(
    context: &ClaimContext,
    report: ClaimReport,
    barrier: &StabilityBarrier,
    mut cancel: watch::Receiver<bool>,
    trace: &mut ReasoningTrace,
) -> CredenceResult<ClaimReport> {
    let settled = tokio::select! {
        biased;
        _ = cancelled(&mut cancel) => return Err(PipelineError::Cancelled.into()),
        settled = barrier.settled() => settled,
    };
    if !settled {
        debug!(claim_id = %report.claim.claim_id, "scope failure, claim not committed");
        return Err(PipelineError::ScopesFailed {
            claim_id: report.claim.claim_id.clone(),
        }
        .into());
    }

    ensure_active(&cancel)?;
    context.sink.commit(report.claim.clone())?;
    trace.record(
        TraceComponent::Pipeline,
        "commit",
        report.claim.claim_id.as_str(),
        json!({ "adjusted_confidence": report.claim.adjusted_confidence }),
    );
    Ok(report)
}

/// A reference id may belong to one scope only.
fn check_disjoint_scopes(scopes: &[ScopeInput]) -> Result<(), ResolutionError> {
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for scope in scopes {
        for reference in &scope.references {
            if let Some(first) = owners.insert(&reference.ref_id, &scope.scope) {
                if first != scope.scope {
                    return Err(ResolutionError::DuplicateReference {
                        ref_id: reference.ref_id.clone(),
                        scope: format!("{first}, {}", scope.scope),
                    });
                }
            }
        }
    }
    Ok(())
}

async fn acquire(
    permits: Arc<Semaphore>,
    mut cancel: watch::Receiver<bool>,
) -> CredenceResult<OwnedSemaphorePermit> {
    tokio::select! {
        biased;
        _ = cancelled(&mut cancel) => Err(PipelineError::Cancelled.into()),
        permit = permits.acquire_owned() => permit.map_err(|_| PipelineError::Cancelled.into()),
    }
}

/// Resolves once cancellation is requested or the pipeline is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|c| *c).await;
}

fn ensure_active(cancel: &watch::Receiver<bool>) -> Result<(), PipelineError> {
    if *cancel.borrow() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

fn flatten<T>(
    joined: Result<CredenceResult<T>, tokio::task::JoinError>,
    task: &str,
) -> CredenceResult<T> {
    joined.map_err(|e| PipelineError::TaskFailed {
        task: task.to_string(),
        message: e.to_string(),
    })?
}
