use serde::{Deserialize, Serialize};

/// A theoretical construct and the observable indicators that evidence it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Construct {
    pub name: String,
    #[serde(default)]
    pub definition: String,
    pub observable_indicators: Vec<String>,
    /// Predicates this construct explicitly covers, in addition to indicator matches.
    #[serde(default)]
    pub predicates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hypothesis {
    pub id: String,
    pub statement: String,
    /// Constructs the hypothesis is evaluated against. Empty = all constructs.
    #[serde(default)]
    pub constructs: Vec<String>,
}

/// Externally supplied theory schema. Read-only to this library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TheorySchema {
    pub theory_id: String,
    pub constructs: Vec<Construct>,
    pub hypotheses: Vec<Hypothesis>,
}

impl TheorySchema {
    pub fn construct(&self, name: &str) -> Option<&Construct> {
        self.constructs.iter().find(|c| c.name == name)
    }
}

/// Ordered strength rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    Weak,
    Moderate,
    Strong,
    Foundational,
}

impl StrengthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::Foundational => "foundational",
        }
    }
}

/// An indicator matched against one claim or evidence attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMatch {
    pub indicator: String,
    /// The attribute text the indicator matched (predicate, caveat, ...).
    pub attribute: String,
    /// Where the attribute came from: `claim` or an evidence source id.
    pub origin: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructMatch {
    pub construct: String,
    pub matched_indicators: Vec<IndicatorMatch>,
    pub total_indicators: usize,
    /// matched / total indicators.
    pub coverage: f64,
    pub construct_match_confidence: f64,
    /// Whether this construct maps the claim predicate.
    pub maps_predicate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisSupport {
    Supported,
    Unsupported,
    Indeterminate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisVerdict {
    pub hypothesis_id: String,
    pub support: HypothesisSupport,
    /// Best mapped indicator confidence, if any indicator mapped.
    pub best_indicator_confidence: Option<f64>,
}

/// Derived, recomputable fit of one claim against one theory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryFitResult {
    pub claim_id: String,
    pub theory_id: String,
    pub construct_matches: Vec<ConstructMatch>,
    pub strength_level: StrengthLevel,
    pub fit_confidence: f64,
    pub hypotheses_supported: Vec<String>,
    pub hypothesis_verdicts: Vec<HypothesisVerdict>,
}
