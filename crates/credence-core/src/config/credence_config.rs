//! Top-level Credence configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AggregationConfig, CrossModalConfig, NormalizerConfig, ObservabilityConfig, PipelineConfig,
    ResolutionConfig, TheoryConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredenceConfig {
    pub normalizer: NormalizerConfig,
    pub resolution: ResolutionConfig,
    pub aggregation: AggregationConfig,
    pub theory: TheoryConfig,
    pub crossmodal: CrossModalConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

impl CredenceConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every numeric setting against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, chain) in &self.normalizer.chains {
            for factor in chain {
                if !(factor.retention > 0.0 && factor.retention <= 1.0) {
                    return Err(invalid(
                        &format!("normalizer.chains.{name}.{}", factor.stage),
                        "retention must be in (0, 1]",
                    ));
                }
            }
        }

        let r = &self.resolution;
        unit_open_closed("resolution.resolution_threshold", r.resolution_threshold)?;
        unit_open_closed("resolution.partial_threshold", r.partial_threshold)?;
        if r.partial_threshold >= r.resolution_threshold {
            return Err(invalid(
                "resolution.partial_threshold",
                "must be below resolution_threshold",
            ));
        }
        unit_open_closed("resolution.self_identification_match", r.self_identification_match)?;
        unit_open_closed(
            "resolution.self_identification_mismatch",
            r.self_identification_mismatch,
        )?;
        unit_open_closed("resolution.oppositional_in_group", r.oppositional_in_group)?;
        unit_open_closed("resolution.associative_ceiling", r.associative_ceiling)?;

        let a = &self.aggregation;
        if !(0.0..1.0).contains(&a.false_positive_rate) {
            return Err(invalid("aggregation.false_positive_rate", "must be in [0, 1)"));
        }
        if !(a.likelihood_floor > 0.0 && a.likelihood_floor < 0.5) {
            return Err(invalid("aggregation.likelihood_floor", "must be in (0, 0.5)"));
        }
        for (domain, prior) in &a.domain_priors {
            unit_closed(&format!("aggregation.domain_priors.{domain}"), *prior)?;
        }
        if !(a.volume_half_saturation > 0.0 && a.volume_half_saturation.is_finite()) {
            return Err(invalid("aggregation.volume_half_saturation", "must be > 0"));
        }

        let t = &self.theory;
        unit_closed("theory.hypothesis_floor", t.hypothesis_floor)?;
        unit_open_closed("theory.indicator_min_overlap", t.indicator_min_overlap)?;
        for band in &t.strength_bands {
            let field = format!("theory.strength_bands.{}", band.level.as_str());
            unit_closed(&field, band.min_coverage)?;
            unit_closed(&field, band.min_confidence)?;
        }

        let c = &self.crossmodal;
        unit_closed("crossmodal.step_entity_threshold", c.step_entity_threshold)?;
        unit_closed(
            "crossmodal.step_relationship_threshold",
            c.step_relationship_threshold,
        )?;
        unit_closed(
            "crossmodal.round_trip_aggregate_threshold",
            c.round_trip_aggregate_threshold,
        )?;
        unit_closed(
            "crossmodal.round_trip_entity_threshold",
            c.round_trip_entity_threshold,
        )?;
        unit_closed(
            "crossmodal.round_trip_relationship_threshold",
            c.round_trip_relationship_threshold,
        )?;
        if c.vector_dimensions == 0 {
            return Err(invalid("crossmodal.vector_dimensions", "must be greater than 0"));
        }

        if self.pipeline.max_concurrency == 0 {
            return Err(invalid("pipeline.max_concurrency", "must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn unit_closed(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be between 0.0 and 1.0"))
    }
}

fn unit_open_closed(field: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be in (0.0, 1.0]"))
    }
}
