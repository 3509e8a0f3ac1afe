//! # credence-theory
//!
//! Classifies an aggregated claim against one declared theory schema.
//!
//! Claim and evidence attributes are matched to each construct's observable
//! indicators by normalised token overlap. Construct match confidence is
//! indicator coverage times the mean confidence of the matched indicators.
//! Strength comes from an ordered rubric of threshold bands, and each
//! hypothesis gets a supported / unsupported / indeterminate verdict.
//! The assessor never mutates the claim or its evidence.

pub mod assessor;
pub mod hypotheses;
pub mod matching;
pub mod rubric;
pub mod schema;

pub use assessor::TheoryFitAssessor;
pub use matching::{tokens, Attribute};
pub use schema::{parse_schema, validate_schema};
