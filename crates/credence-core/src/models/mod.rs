//! Shared data model. Boundary records are serde types so they can cross the
//! extraction, theory, knowledge-graph, and cross-modal interfaces as JSON.

pub mod claim;
pub mod conversion;
pub mod dependency;
pub mod entity_reference;
pub mod evidence;
pub mod kg_record;
pub mod theory;

pub use claim::{Claim, ClaimKey, ConfidenceEpoch, EpochReason};
pub use conversion::{
    ConversionRecord, CrossModalReport, EntityRow, Format, GraphData, GraphEdge, GraphNode,
    HopDiagnostic, RelationVector, RelationshipKey, RelationshipRow, Representation,
    RoundTripDiagnostic, TableData, VectorData, VectorEntry,
};
pub use dependency::{DependencyDescriptor, DependencyGroup, DependsOn};
pub use entity_reference::{
    CandidateProbability, ConstraintKind, EntityReference, ReferenceConstraint, ResolutionStatus,
};
pub use evidence::{DegradationFactor, Evidence, Polarity};
pub use kg_record::{EvidenceSummary, KnowledgeGraphRecord, TheoryContext};
pub use theory::{
    Construct, ConstructMatch, Hypothesis, HypothesisSupport, HypothesisVerdict, IndicatorMatch,
    StrengthLevel, TheoryFitResult, TheorySchema,
};
