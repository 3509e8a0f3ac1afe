//! # credence-core
//!
//! Foundation crate for the Credence evidence engine.
//! Defines the shared data model, traits, errors, config, the append-only
//! reasoning trace, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod confidence;
pub mod constants;
pub mod errors;
pub mod models;
pub mod trace;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use confidence::Confidence;
pub use config::CredenceConfig;
pub use errors::{CredenceError, CredenceResult};
pub use models::{
    Claim, ClaimKey, DependencyDescriptor, EntityReference, Evidence, Polarity,
    ResolutionStatus, TheoryFitResult, TheorySchema,
};
pub use trace::ReasoningTrace;
