//! DependencyAwareAggregator: evidence + dependency descriptor + prior → Claim.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use credence_core::config::AggregationConfig;
use credence_core::errors::{AggregationError, CredenceResult};
use credence_core::models::{Claim, ClaimKey, DependencyDescriptor, EpochReason, Evidence};
use credence_core::trace::{ReasoningTrace, TraceComponent};
use credence_core::traits::{
    IEstimator, ILikelihoodModel, IMetaConfidence, MetaConfidenceContext, PriorOrigin,
};
use credence_observability::aggregation_span;

use crate::dependency::{weights, EvidenceGraph, ItemWeight};
use crate::likelihood::CalibratedLikelihoodModel;
use crate::meta::EvidenceVolumeMeta;
use crate::prior::PriorSource;
use crate::rebinding::EntityResolution;

/// Everything needed to score one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub key: ClaimKey,
    pub evidence: Vec<Evidence>,
    pub dependencies: DependencyDescriptor,
    pub prior: PriorSource,
    #[serde(default)]
    pub domain_notes: Vec<String>,
}

impl AggregationRequest {
    pub fn new(
        key: ClaimKey,
        evidence: Vec<Evidence>,
        dependencies: DependencyDescriptor,
        prior: PriorSource,
    ) -> Self {
        Self {
            key,
            evidence,
            dependencies,
            prior,
            domain_notes: Vec::new(),
        }
    }

    pub fn with_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_notes = notes.into_iter().map(Into::into).collect();
        self
    }
}

/// One evidence item's share of the joint likelihood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemContribution {
    pub source_id: String,
    pub given_h: f64,
    pub given_not_h: f64,
    pub novelty: f64,
    pub base: f64,
    pub weight: f64,
}

/// Intermediate values of one aggregation, for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationBreakdown {
    pub prior: f64,
    pub prior_origin: PriorOrigin,
    pub items: Vec<ItemContribution>,
    /// `Π P(E_i|H)^{w_i}`.
    pub joint_given_h: f64,
    /// `Π P(E_i|¬H)^{w_i}`.
    pub joint_given_not_h: f64,
    pub effective_evidence: f64,
    pub posterior: f64,
    pub meta_confidence: f64,
    pub adjusted_confidence: f64,
    pub likelihood_model: String,
    pub meta_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationOutcome {
    pub claim: Claim,
    pub breakdown: AggregationBreakdown,
}

/// Combines evidence about one claim into a posterior, discounting shared lineage.
pub struct DependencyAwareAggregator {
    config: AggregationConfig,
    likelihood: Arc<dyn ILikelihoodModel>,
    meta: Arc<dyn IMetaConfidence>,
    estimator: Option<Arc<dyn IEstimator>>,
}

impl DependencyAwareAggregator {
    /// Calibrated likelihood model and evidence-volume meta-confidence from config, no estimator.
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            config: config.clone(),
            likelihood: Arc::new(CalibratedLikelihoodModel::from_config(config)),
            meta: Arc::new(EvidenceVolumeMeta::new(config.volume_half_saturation)),
            estimator: None,
        }
    }

    pub fn with_likelihood_model(mut self, model: Arc<dyn ILikelihoodModel>) -> Self {
        self.likelihood = model;
        self
    }

    pub fn with_meta_confidence(mut self, meta: Arc<dyn IMetaConfidence>) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn IEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Score a new claim. The returned claim carries one `Initial` epoch.
    pub fn aggregate(
        &self,
        request: &AggregationRequest,
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<AggregationOutcome> {
        let breakdown = self.compute(request)?;
        let claim = Claim {
            claim_id: request.key.claim_id(),
            subject_entity: request.key.subject.clone(),
            predicate: request.key.predicate.clone(),
            object_entity: request.key.object.clone(),
            evidence_refs: request.evidence.iter().map(|e| e.source_id.clone()).collect(),
            dependency_graph: request.dependencies.clone(),
            posterior_confidence: 0.0,
            meta_confidence: 0.0,
            adjusted_confidence: 0.0,
            epochs: Vec::new(),
        }
        .with_epoch(
            breakdown.prior,
            breakdown.posterior,
            breakdown.meta_confidence,
            EpochReason::Initial,
        );

        record(trace, &claim, &breakdown, &EpochReason::Initial);
        info!(
            claim_id = %claim.claim_id,
            posterior = breakdown.posterior,
            adjusted = breakdown.adjusted_confidence,
            "aggregated claim"
        );
        Ok(AggregationOutcome { claim, breakdown })
    }

    /// Recompute an existing claim and append a new epoch. The claim id and
    /// all earlier epochs are kept.
    pub fn recompute(
        &self,
        claim: Claim,
        evidence: Vec<Evidence>,
        prior: PriorSource,
        domain_notes: Vec<String>,
        reason: EpochReason,
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<AggregationOutcome> {
        let request = AggregationRequest {
            key: claim.key(),
            evidence,
            dependencies: claim.dependency_graph.clone(),
            prior,
            domain_notes,
        };
        let breakdown = self.compute(&request)?;

        let mut claim = claim.with_epoch(
            breakdown.prior,
            breakdown.posterior,
            breakdown.meta_confidence,
            reason.clone(),
        );
        claim.evidence_refs = request.evidence.iter().map(|e| e.source_id.clone()).collect();

        record(trace, &claim, &breakdown, &reason);
        info!(
            claim_id = %claim.claim_id,
            epoch = claim.epochs.len() - 1,
            posterior = breakdown.posterior,
            "recomputed claim"
        );
        Ok(AggregationOutcome { claim, breakdown })
    }

    /// Apply a late entity resolution to a claim scored against the
    /// reference's placeholder: the endpoint is rebound to the resolved
    /// entity and the claim is recomputed under an `EntityResolved` epoch.
    /// The claim id and earlier epochs are kept.
    pub fn apply_resolution(
        &self,
        claim: Claim,
        resolution: &EntityResolution,
        evidence: Vec<Evidence>,
        prior: PriorSource,
        domain_notes: Vec<String>,
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<AggregationOutcome> {
        if !resolution.affects(&claim) {
            return Err(AggregationError::UnaffectedClaim {
                claim_id: claim.claim_id,
                ref_id: resolution.ref_id.clone(),
            }
            .into());
        }
        debug!(
            claim_id = %claim.claim_id,
            ref_id = %resolution.ref_id,
            entity = %resolution.entity_id,
            "rebinding claim to resolved entity"
        );
        self.recompute(
            resolution.rebind(claim),
            evidence,
            prior,
            domain_notes,
            EpochReason::EntityResolved {
                ref_id: resolution.ref_id.clone(),
            },
            trace,
        )
    }

    /// The numeric core: validation, weights, joint likelihoods, Bayes, meta discount.
    pub fn compute(&self, request: &AggregationRequest) -> CredenceResult<AggregationBreakdown> {
        let key = &request.key;
        let _span = aggregation_span!(key.claim_id(), request.evidence.len()).entered();

        if request.evidence.is_empty() {
            return Err(AggregationError::InsufficientEvidence {
                claim: key.to_string(),
            }
            .into());
        }
        for evidence in &request.evidence {
            if evidence.predicate != key.predicate {
                return Err(AggregationError::ForeignEvidence {
                    source_id: evidence.source_id.clone(),
                    claim: key.to_string(),
                }
                .into());
            }
        }
        let coefficient = request.dependencies.independence_coefficient;
        if !coefficient.is_finite() || !(0.0..=1.0).contains(&coefficient) {
            return Err(AggregationError::InvalidParameter {
                name: "independence_coefficient".to_string(),
                value: coefficient,
                reason: "must be declared in [0, 1]".to_string(),
            }
            .into());
        }

        let order: Vec<&str> = request.evidence.iter().map(|e| e.source_id.as_str()).collect();
        let graph = EvidenceGraph::build(&order, &request.dependencies)?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            groups = request.dependencies.groups.len(),
            "validated dependency graph"
        );

        let (prior, prior_origin) =
            request
                .prior
                .resolve(key, &self.config, self.estimator.as_deref())?;

        let mut marginals = Vec::with_capacity(request.evidence.len());
        for evidence in &request.evidence {
            let m = self.likelihood.marginal(evidence)?;
            for (name, value) in [("given_h", m.given_h), ("given_not_h", m.given_not_h)] {
                if !value.is_finite() || value <= 0.0 || value > 1.0 {
                    return Err(AggregationError::InvalidParameter {
                        name: format!("{}.{name}", evidence.source_id),
                        value,
                        reason: format!("likelihood from '{}' must be in (0, 1]", self.likelihood.name()),
                    }
                    .into());
                }
            }
            marginals.push(m);
        }

        let log_ratios: BTreeMap<String, f64> = order
            .iter()
            .zip(&marginals)
            .map(|(id, m)| ((*id).to_string(), m.log_ratio()))
            .collect();
        let item_weights = weights::weights(&order, &log_ratios, &request.dependencies);

        let mut items = Vec::with_capacity(order.len());
        let mut log_h = 0.0;
        let mut log_not_h = 0.0;
        let mut effective_evidence = 0.0;
        for (id, m) in order.iter().zip(&marginals) {
            let w = item_weights.get(*id).copied().unwrap_or(ItemWeight {
                novelty: 1.0,
                base: 1.0,
                weight: 1.0,
            });
            log_h += w.weight * m.given_h.ln();
            log_not_h += w.weight * m.given_not_h.ln();
            effective_evidence += w.weight;
            items.push(ItemContribution {
                source_id: (*id).to_string(),
                given_h: m.given_h,
                given_not_h: m.given_not_h,
                novelty: w.novelty,
                base: w.base,
                weight: w.weight,
            });
        }

        let posterior = bayes(prior, log_h, log_not_h)?;

        let ctx = MetaConfidenceContext {
            claim: key,
            evidence_count: request.evidence.len(),
            effective_evidence,
            prior,
            prior_origin,
            posterior,
            independence_coefficient: coefficient,
            domain_notes: &request.domain_notes,
        };
        let meta_confidence = self.meta.meta_confidence(&ctx)?;
        if !meta_confidence.is_finite() || !(0.0..=1.0).contains(&meta_confidence) {
            return Err(AggregationError::InvalidParameter {
                name: "meta_confidence".to_string(),
                value: meta_confidence,
                reason: format!("strategy '{}' must return a value in [0, 1]", self.meta.name()),
            }
            .into());
        }

        Ok(AggregationBreakdown {
            prior,
            prior_origin,
            items,
            joint_given_h: log_h.exp(),
            joint_given_not_h: log_not_h.exp(),
            effective_evidence,
            posterior,
            meta_confidence,
            adjusted_confidence: posterior * meta_confidence,
            likelihood_model: self.likelihood.name().to_string(),
            meta_strategy: self.meta.name().to_string(),
        })
    }
}

/// `prior·L_H / (prior·L_H + (1−prior)·L_¬H)`, with both joint likelihoods
/// rescaled by their maximum in log space so long evidence lists cannot underflow.
fn bayes(prior: f64, log_h: f64, log_not_h: f64) -> CredenceResult<f64> {
    let scale = log_h.max(log_not_h);
    let l_h = (log_h - scale).exp();
    let l_not_h = (log_not_h - scale).exp();
    let numerator = prior * l_h;
    let denominator = numerator + (1.0 - prior) * l_not_h;
    if !denominator.is_finite() || denominator <= 0.0 {
        return Err(AggregationError::InvalidParameter {
            name: "bayes_denominator".to_string(),
            value: denominator,
            reason: "prior and joint likelihoods leave no probability mass".to_string(),
        }
        .into());
    }
    Ok((numerator / denominator).clamp(0.0, 1.0))
}

fn record(
    trace: &mut ReasoningTrace,
    claim: &Claim,
    breakdown: &AggregationBreakdown,
    reason: &EpochReason,
) {
    trace.record(
        TraceComponent::Aggregator,
        "aggregate",
        &claim.claim_id,
        json!({
            "epoch": claim.epochs.len().saturating_sub(1),
            "reason": reason,
            "breakdown": breakdown,
        }),
    );
}
