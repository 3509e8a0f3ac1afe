use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::DegradationFactor;

/// Evidence normalizer configuration.
///
/// ```toml
/// [normalizer.chains]
/// ocr_pipeline = [
///     { stage = "ocr", retention = 0.95 },
///     { stage = "chunking", retention = 0.98 },
/// ]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Named degradation chains, applied in declaration order.
    pub chains: BTreeMap<String, Vec<DegradationFactor>>,
}
