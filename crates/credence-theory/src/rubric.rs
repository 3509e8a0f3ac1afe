//! Strength rubric classification.

use credence_core::config::StrengthBand;
use credence_core::models::StrengthLevel;

/// Highest band whose minimums are both strictly exceeded; `Weak` otherwise.
///
/// Bands are checked from the strongest level down regardless of their
/// configured order. A value sitting exactly on a minimum does not reach
/// that band.
pub fn classify(bands: &[StrengthBand], coverage: f64, confidence: f64) -> StrengthLevel {
    let mut ordered: Vec<&StrengthBand> = bands.iter().collect();
    ordered.sort_by(|a, b| b.level.cmp(&a.level));
    ordered
        .into_iter()
        .find(|band| coverage > band.min_coverage && confidence > band.min_confidence)
        .map_or(StrengthLevel::Weak, |band| band.level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credence_core::config::TheoryConfig;

    #[test]
    fn ties_fall_to_the_lower_level() {
        let bands = TheoryConfig::default().strength_bands;
        // Exactly on the foundational minimums.
        assert_eq!(classify(&bands, 0.75, 0.85), StrengthLevel::Strong);
        assert_eq!(classify(&bands, 0.76, 0.86), StrengthLevel::Foundational);
        assert_eq!(classify(&bands, 0.25, 0.99), StrengthLevel::Weak);
    }

    #[test]
    fn band_order_in_config_does_not_matter() {
        let mut bands = TheoryConfig::default().strength_bands;
        bands.reverse();
        assert_eq!(classify(&bands, 1.0, 1.0), StrengthLevel::Foundational);
    }
}
