//! # credence-normalizer
//!
//! Converts per-tool extraction records into canonical [`Evidence`](credence_core::Evidence).
//!
//! Input is validated strictly: unknown fields, missing predicate/subject/object,
//! and out-of-range confidences are rejected with `MalformedExtraction`, never coerced.
//! The recorded confidence is degraded by the declared chain of stage retention factors.

pub mod chain;
pub mod extraction;
pub mod normalizer;

pub use chain::DegradationChain;
pub use extraction::RawExtraction;
pub use normalizer::EvidenceNormalizer;
