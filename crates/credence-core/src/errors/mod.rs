//! Error handling for Credence.
//! One error enum per subsystem, `thiserror` only. Nothing here is retried
//! internally; every error carries enough context for the caller to act on it.

pub mod aggregation_error;
pub mod config_error;
pub mod conversion_error;
pub mod credence_error;
pub mod error_code;
pub mod normalization_error;
pub mod pipeline_error;
pub mod resolution_error;
pub mod theory_error;

pub use aggregation_error::AggregationError;
pub use config_error::ConfigError;
pub use conversion_error::ConversionError;
pub use credence_error::{CredenceError, CredenceResult};
pub use error_code::CredenceErrorCode;
pub use normalization_error::NormalizationError;
pub use pipeline_error::PipelineError;
pub use resolution_error::ResolutionError;
pub use theory_error::TheoryFitError;
