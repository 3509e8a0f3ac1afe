//! Seams where collaborators and strategies are injected.

pub mod claim_sink;
pub mod estimator;
pub mod format_converter;
pub mod likelihood;
pub mod meta_confidence;

pub use claim_sink::IClaimSink;
pub use estimator::{Estimate, EstimateField, EstimateSchema, IEstimator};
pub use format_converter::IFormatConverter;
pub use likelihood::{ILikelihoodModel, MarginalLikelihood};
pub use meta_confidence::{IMetaConfidence, MetaConfidenceContext, PriorOrigin};
