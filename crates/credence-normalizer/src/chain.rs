//! Ordered degradation chains.

use credence_core::errors::NormalizationError;
use credence_core::models::DegradationFactor;

/// Stage-specific retention factors applied to an extraction confidence, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DegradationChain {
    stages: Vec<DegradationFactor>,
}

impl DegradationChain {
    /// Build a chain, rejecting any factor outside (0, 1].
    pub fn new(stages: Vec<DegradationFactor>) -> Result<Self, NormalizationError> {
        for stage in &stages {
            if !(stage.retention > 0.0 && stage.retention <= 1.0) {
                return Err(NormalizationError::InvalidDegradationFactor {
                    stage: stage.stage.clone(),
                    factor: stage.retention,
                });
            }
        }
        Ok(Self { stages })
    }

    /// A chain with no stages (retention 1.0).
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stages(&self) -> &[DegradationFactor] {
        &self.stages
    }

    /// Π(retention factors).
    pub fn retention(&self) -> f64 {
        self.stages.iter().map(|s| s.retention).product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_above_one() {
        assert!(DegradationChain::new(vec![DegradationFactor::new("ocr", 0.0)]).is_err());
        assert!(DegradationChain::new(vec![DegradationFactor::new("ocr", 1.01)]).is_err());
        assert!(DegradationChain::new(vec![DegradationFactor::new("ocr", f64::NAN)]).is_err());
    }

    #[test]
    fn empty_chain_retains_everything() {
        assert_eq!(DegradationChain::empty().retention(), 1.0);
    }
}
