//! # credence-aggregation
//!
//! Combines the evidence for one claim into a single posterior.
//!
//! Each item contributes its marginal likelihoods raised to a weight
//! `w_i = base_i × novelty_i`: derived or correlated sources are discounted
//! by their declared dependence, and every item except the strongest
//! (the anchor) is further scaled by the independence coefficient. With full
//! independence and no declared lineage the joint is the plain product.
//!
//! Meta-confidence is a pluggable strategy and can only lower the result.

pub mod aggregator;
pub mod dependency;
pub mod grouping;
pub mod likelihood;
pub mod meta;
pub mod prior;
pub mod rebinding;

pub use aggregator::{
    AggregationBreakdown, AggregationOutcome, AggregationRequest, DependencyAwareAggregator,
    ItemContribution,
};
pub use grouping::group_evidence;
pub use likelihood::{CalibratedLikelihoodModel, EstimatorLikelihoodModel};
pub use meta::{EstimatorMetaConfidence, EvidenceVolumeMeta, FixedMetaConfidence};
pub use prior::PriorSource;
pub use rebinding::EntityResolution;
