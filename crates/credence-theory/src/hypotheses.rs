//! Evidentiary sufficiency rules for hypotheses.

use credence_core::models::{ConstructMatch, Hypothesis, HypothesisSupport, HypothesisVerdict};

/// Verdict for one hypothesis over the construct matches it names (all
/// constructs when it names none).
///
/// Supported if any mapped indicator reaches `floor`, indeterminate if
/// indicators mapped but all fall below it, unsupported if none mapped.
pub fn evaluate(hypothesis: &Hypothesis, matches: &[ConstructMatch], floor: f64) -> HypothesisVerdict {
    let best = matches
        .iter()
        .filter(|m| hypothesis.constructs.is_empty() || hypothesis.constructs.contains(&m.construct))
        .flat_map(|m| m.matched_indicators.iter())
        .map(|i| i.confidence)
        .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |a| a.max(c))));

    let support = match best {
        None => HypothesisSupport::Unsupported,
        Some(c) if c >= floor => HypothesisSupport::Supported,
        Some(_) => HypothesisSupport::Indeterminate,
    };
    HypothesisVerdict {
        hypothesis_id: hypothesis.id.clone(),
        support,
        best_indicator_confidence: best,
    }
}
