//! # credence-crossmodal
//!
//! Checks that entities and relationships survive conversion between graph,
//! table, and vector representations. Each hop is scored against the
//! previous representation; a sequence that returns to its starting format
//! is also scored end to end against the original input.

pub mod converter;
pub mod embedding;
pub mod indexed_graph;
pub mod materialize;
pub mod validator;

pub use converter::StructuralConverter;
pub use indexed_graph::IndexedGraph;
pub use materialize::claims_to_graph;
pub use validator::CrossModalValidator;
