use super::error_code::{self, CredenceErrorCode};
use super::{
    AggregationError, ConfigError, ConversionError, NormalizationError, PipelineError,
    ResolutionError, TheoryFitError,
};

/// Top-level error aggregating every subsystem error via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum CredenceError {
    #[error("normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("theory fit error: {0}")]
    TheoryFit(#[from] TheoryFitError),

    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CredenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl CredenceErrorCode for CredenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Normalization(e) => e.error_code(),
            Self::Resolution(e) => e.error_code(),
            Self::Aggregation(e) => e.error_code(),
            Self::TheoryFit(e) => e.error_code(),
            Self::Conversion(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Pipeline(e) => e.error_code(),
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}

pub type CredenceResult<T> = Result<T, CredenceError>;
