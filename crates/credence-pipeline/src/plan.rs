//! Run input and output records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use credence_aggregation::{AggregationBreakdown, PriorSource};
use credence_core::errors::CredenceError;
use credence_core::models::{
    Claim, ClaimKey, CrossModalReport, DependencyDescriptor, DependencyGroup, Evidence, Format,
    KnowledgeGraphRecord, TheoryFitResult, TheorySchema,
};
use credence_core::ReasoningTrace;
use credence_normalizer::RawExtraction;
use credence_resolution::{ScopeInput, ScopeResolution};

/// Everything one run consumes.
///
/// `dependencies` describes lineage across all evidence source ids; each claim
/// receives the part of it that concerns its own evidence. It has no default:
/// the independence coefficient must be declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInput {
    pub extractions: Vec<RawExtraction>,
    /// Configured degradation chain applied to every extraction. `None` applies no degradation.
    #[serde(default)]
    pub chain: Option<String>,
    pub scopes: Vec<ScopeInput>,
    pub dependencies: DependencyDescriptor,
    pub prior: PriorSource,
    #[serde(default)]
    pub domain_notes: Vec<String>,
    /// Theory every claim is assessed against.
    #[serde(default)]
    pub theory: Option<TheorySchema>,
    /// Round-trip the committed claim graph through this format and report preservation.
    #[serde(default)]
    pub cross_modal_via: Option<Format>,
}

impl PipelineInput {
    pub fn new(
        extractions: Vec<RawExtraction>,
        scopes: Vec<ScopeInput>,
        dependencies: DependencyDescriptor,
        prior: PriorSource,
    ) -> Self {
        Self {
            extractions,
            chain: None,
            scopes,
            dependencies,
            prior,
            domain_notes: Vec::new(),
            theory: None,
            cross_modal_via: None,
        }
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn with_theory(mut self, theory: TheorySchema) -> Self {
        self.theory = Some(theory);
        self
    }

    pub fn with_cross_modal(mut self, via: Format) -> Self {
        self.cross_modal_via = Some(via);
        self
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

/// A claim that was computed and committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReport {
    pub claim: Claim,
    pub breakdown: AggregationBreakdown,
    pub theory_fit: Option<TheoryFitResult>,
    pub record: KnowledgeGraphRecord,
}

/// A claim whose computation failed. Nothing was committed for it.
#[derive(Debug)]
pub struct ClaimFailure {
    pub key: ClaimKey,
    pub error: CredenceError,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub evidence: Vec<Evidence>,
    /// Finalized scopes, in input order.
    pub resolutions: Vec<ScopeResolution>,
    /// Committed claims, ordered by claim key.
    pub claims: Vec<ClaimReport>,
    pub failures: Vec<ClaimFailure>,
    pub cross_modal: Option<CrossModalReport>,
    pub trace: ReasoningTrace,
}

impl PipelineOutput {
    pub fn claim(&self, key: &ClaimKey) -> Option<&ClaimReport> {
        self.claims.iter().find(|c| c.claim.key() == *key)
    }

    pub fn records(&self) -> impl Iterator<Item = &KnowledgeGraphRecord> + '_ {
        self.claims.iter().map(|c| &c.record)
    }

    /// Every claim was committed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The part of `dependencies` whose evidence ids are all in `ids`. Groups
/// keep their members inside `ids` and are dropped below two members.
pub fn restrict_dependencies(
    dependencies: &DependencyDescriptor,
    ids: &BTreeSet<&str>,
) -> DependencyDescriptor {
    DependencyDescriptor {
        depends_on: dependencies
            .depends_on
            .iter()
            .filter(|d| ids.contains(d.evidence_id.as_str()) && ids.contains(d.depends_on.as_str()))
            .cloned()
            .collect(),
        groups: dependencies
            .groups
            .iter()
            .filter_map(|g| {
                let members: Vec<String> = g
                    .members
                    .iter()
                    .filter(|m| ids.contains(m.as_str()))
                    .cloned()
                    .collect();
                (members.len() >= 2).then(|| DependencyGroup {
                    members,
                    correlation: g.correlation,
                })
            })
            .collect(),
        independence_coefficient: dependencies.independence_coefficient,
    }
}
