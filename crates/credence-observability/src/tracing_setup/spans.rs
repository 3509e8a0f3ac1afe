//! Span definitions per component, plus one span per pipeline run.
//!
//! Each span carries the identifiers needed to correlate log lines with the reasoning trace.

/// Create a normalization span.
#[macro_export]
macro_rules! normalize_span {
    ($source_id:expr) => {
        tracing::info_span!("credence.normalize", source_id = %$source_id)
    };
}

/// Create an entity resolution span for one document/speaker scope.
#[macro_export]
macro_rules! resolution_span {
    ($scope:expr) => {
        tracing::info_span!("credence.resolution", scope = %$scope)
    };
}

/// Create an aggregation span.
#[macro_export]
macro_rules! aggregation_span {
    ($claim_id:expr, $evidence_count:expr) => {
        tracing::info_span!(
            "credence.aggregation",
            claim_id = %$claim_id,
            evidence_count = $evidence_count
        )
    };
}

/// Create a theory fit span.
#[macro_export]
macro_rules! theory_fit_span {
    ($claim_id:expr, $theory_id:expr) => {
        tracing::info_span!("credence.theory_fit", claim_id = %$claim_id, theory_id = %$theory_id)
    };
}

/// Create a cross-modal validation span.
#[macro_export]
macro_rules! crossmodal_span {
    ($hops:expr) => {
        tracing::info_span!("credence.crossmodal", hops = $hops)
    };
}

/// Create a span covering one pipeline run.
#[macro_export]
macro_rules! pipeline_span {
    ($run_id:expr, $scopes:expr) => {
        tracing::info_span!("credence.pipeline", run_id = %$run_id, scopes = $scopes)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const NORMALIZE: &str = "credence.normalize";
    pub const RESOLUTION: &str = "credence.resolution";
    pub const AGGREGATION: &str = "credence.aggregation";
    pub const THEORY_FIT: &str = "credence.theory_fit";
    pub const CROSSMODAL: &str = "credence.crossmodal";
    pub const PIPELINE: &str = "credence.pipeline";
}
