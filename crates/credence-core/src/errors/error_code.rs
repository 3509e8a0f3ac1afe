//! Stable machine-readable error codes for callers that route on error kind.

pub const MALFORMED_EXTRACTION: &str = "MALFORMED_EXTRACTION";
pub const CONSTRAINT_CONFLICT: &str = "CONSTRAINT_CONFLICT";
pub const RESOLUTION_ERROR: &str = "RESOLUTION_ERROR";
pub const INSUFFICIENT_EVIDENCE: &str = "INSUFFICIENT_EVIDENCE";
pub const INVALID_DEPENDENCY_GRAPH: &str = "INVALID_DEPENDENCY_GRAPH";
pub const AGGREGATION_ERROR: &str = "AGGREGATION_ERROR";
pub const SCHEMA_MISMATCH: &str = "SCHEMA_MISMATCH";
pub const INVALID_SCHEMA: &str = "INVALID_SCHEMA";
pub const CONVERSION_INTEGRITY: &str = "CONVERSION_INTEGRITY";
pub const CONVERSION_ERROR: &str = "CONVERSION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PIPELINE_ERROR: &str = "PIPELINE_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";

/// Implemented by every Credence error enum.
pub trait CredenceErrorCode {
    /// A stable code such as `CONSTRAINT_CONFLICT`.
    fn error_code(&self) -> &'static str;
}
