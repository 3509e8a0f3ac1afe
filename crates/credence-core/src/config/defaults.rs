// Single source of truth for all default values.

// --- Resolution ---
pub const DEFAULT_RESOLUTION_THRESHOLD: f64 = 0.85;
pub const DEFAULT_PARTIAL_THRESHOLD: f64 = 0.5;
pub const DEFAULT_SELF_IDENTIFICATION_MATCH: f64 = 0.98;
pub const DEFAULT_SELF_IDENTIFICATION_MISMATCH: f64 = 0.02;
pub const DEFAULT_OPPOSITIONAL_IN_GROUP: f64 = 0.35;
pub const DEFAULT_ASSOCIATIVE_CEILING: f64 = 0.8;

// --- Aggregation ---
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.1;
pub const DEFAULT_LIKELIHOOD_FLOOR: f64 = 1e-6;
pub const DEFAULT_VOLUME_HALF_SATURATION: f64 = 1.0;

// --- Theory fit ---
pub const DEFAULT_HYPOTHESIS_FLOOR: f64 = 0.6;
pub const DEFAULT_INDICATOR_MIN_OVERLAP: f64 = 0.5;

// --- Cross-modal ---
pub const DEFAULT_STEP_ENTITY_THRESHOLD: f64 = 0.95;
pub const DEFAULT_STEP_RELATIONSHIP_THRESHOLD: f64 = 0.98;
pub const DEFAULT_ROUND_TRIP_AGGREGATE_THRESHOLD: f64 = 0.80;
pub const DEFAULT_ROUND_TRIP_ENTITY_THRESHOLD: f64 = 0.95;
pub const DEFAULT_ROUND_TRIP_RELATIONSHIP_THRESHOLD: f64 = 0.90;
pub const DEFAULT_VECTOR_DIMENSIONS: usize = 64;

// --- Pipeline ---
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
