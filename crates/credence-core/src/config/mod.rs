//! Configuration system for Credence.
//! TOML-based; every section falls back to compiled defaults field by field.

pub mod aggregation_config;
pub mod credence_config;
pub mod crossmodal_config;
pub mod defaults;
pub mod normalizer_config;
pub mod observability_config;
pub mod pipeline_config;
pub mod resolution_config;
pub mod theory_config;

pub use aggregation_config::AggregationConfig;
pub use credence_config::CredenceConfig;
pub use crossmodal_config::CrossModalConfig;
pub use normalizer_config::NormalizerConfig;
pub use observability_config::ObservabilityConfig;
pub use pipeline_config::PipelineConfig;
pub use resolution_config::ResolutionConfig;
pub use theory_config::{StrengthBand, TheoryConfig};
