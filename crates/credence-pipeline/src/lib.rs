//! # credence-pipeline
//!
//! Concurrent orchestration of the Credence components.
//!
//! A run normalizes extractions, resolves every document/speaker scope in its
//! own task, waits on a [`StabilityBarrier`] until every referenced entity is
//! stable, then aggregates and theory-fits each claim in its own task. The
//! worker pool is bounded by a semaphore. Claims are committed to an
//! [`IClaimSink`](credence_core::traits::IClaimSink) only once fully
//! computed, and each committed claim is exported as a
//! [`KnowledgeGraphRecord`](credence_core::models::KnowledgeGraphRecord).

pub mod barrier;
pub mod export;
pub mod pipeline;
pub mod plan;
pub mod store;

pub use barrier::StabilityBarrier;
pub use export::knowledge_graph_record;
pub use pipeline::CredencePipeline;
pub use plan::{restrict_dependencies, ClaimFailure, ClaimReport, PipelineInput, PipelineOutput};
pub use store::MemoryClaimStore;
