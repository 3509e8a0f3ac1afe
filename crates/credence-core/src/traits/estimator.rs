use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::CredenceResult;

/// A named numeric field the estimator must return, with its allowed range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateField {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

/// Shape of the structured result an estimator call must produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateSchema {
    pub name: String,
    pub fields: Vec<EstimateField>,
}

impl EstimateSchema {
    /// Schema whose fields are all probabilities in [0, 1].
    pub fn probabilities(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields
                .iter()
                .map(|f| EstimateField {
                    name: (*f).to_string(),
                    min: 0.0,
                    max: 1.0,
                })
                .collect(),
        }
    }

    /// Check that every field is present, finite, and in range.
    pub fn validate(&self, estimate: &Estimate) -> Result<(), String> {
        for field in &self.fields {
            match estimate.values.get(&field.name) {
                None => return Err(format!("missing field '{}'", field.name)),
                Some(v) if !v.is_finite() || *v < field.min || *v > field.max => {
                    return Err(format!(
                        "field '{}' = {} outside [{}, {}]",
                        field.name, v, field.min, field.max
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Structured estimator output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub values: BTreeMap<String, f64>,
    #[serde(default)]
    pub rationale: String,
}

impl Estimate {
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// Injected estimation capability (typically an LLM behind the orchestration
/// layer). Implementations must be swappable with deterministic doubles.
pub trait IEstimator: Send + Sync {
    fn estimate(&self, prompt: &str, schema: &EstimateSchema) -> CredenceResult<Estimate>;

    /// Human-readable estimator name, used in errors and traces.
    fn name(&self) -> &str;
}
