/// Credence library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bucket name for residual probability mass not assigned to any candidate.
pub const UNKNOWN_ENTITY: &str = "unknown";

/// Tolerance used when checking that probability masses sum to one.
pub const PROBABILITY_EPSILON: f64 = 1e-9;

/// Prefix for entity ids of references that finished unresolved.
pub const UNRESOLVED_ENTITY_PREFIX: &str = "unresolved:";

/// `confidence_type` emitted on knowledge-graph records.
pub const CONFIDENCE_TYPE_BAYESIAN: &str = "bayesian_posterior_meta_adjusted";

/// Prefix for audit trail references on exported records.
pub const AUDIT_TRAIL_SCHEME: &str = "trace";
