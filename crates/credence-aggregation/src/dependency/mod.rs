//! Dependency descriptors: structural validation and per-item discounting.

pub mod dag_enforcement;
pub mod graph;
pub mod weights;

pub use graph::EvidenceGraph;
pub use weights::{novelty, ItemWeight};
