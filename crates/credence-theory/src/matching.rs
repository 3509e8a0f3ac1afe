//! Indicator matching by normalised token overlap.

use std::collections::BTreeSet;

use credence_core::models::{Claim, Construct, Evidence, IndicatorMatch};

/// Function words ignored on both sides of a comparison.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "into", "is", "of", "on", "or",
    "the", "to", "with",
];

/// Origin label for attributes taken from the claim itself.
pub const CLAIM_ORIGIN: &str = "claim";

/// A piece of claim or evidence text that indicators are matched against.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub text: String,
    /// `claim` or the evidence source id.
    pub origin: String,
    pub confidence: f64,
    /// Whether the text is the claim predicate.
    pub is_predicate: bool,
}

/// Lowercased alphanumeric tokens, stopwords removed. Hyphens split words.
pub fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Share of the indicator's tokens present in the attribute, in [0, 1].
pub fn overlap(indicator: &BTreeSet<String>, attribute: &BTreeSet<String>) -> f64 {
    if indicator.is_empty() {
        return 0.0;
    }
    let shared = indicator.intersection(attribute).count();
    shared as f64 / indicator.len() as f64
}

/// Attributes of a claim and its evidence: the claim predicate at posterior
/// confidence, then each evidence predicate and caveat at the evidence's
/// degradation-adjusted confidence.
pub fn attributes(claim: &Claim, evidence: &[Evidence]) -> Vec<Attribute> {
    let mut out = vec![Attribute {
        text: claim.predicate.clone(),
        origin: CLAIM_ORIGIN.to_string(),
        confidence: claim.posterior_confidence,
        is_predicate: true,
    }];
    for item in evidence {
        let confidence = item.raw_confidence.value();
        out.push(Attribute {
            text: item.predicate.clone(),
            origin: item.source_id.clone(),
            confidence,
            is_predicate: true,
        });
        out.extend(item.caveats.iter().map(|caveat| Attribute {
            text: caveat.clone(),
            origin: item.source_id.clone(),
            confidence,
            is_predicate: false,
        }));
    }
    out
}

/// Indicator matches of one construct.
pub struct ConstructHits {
    /// Best match per matched indicator, in schema order.
    pub matches: Vec<IndicatorMatch>,
    /// Some matched indicator came from a predicate attribute.
    pub predicate_hit: bool,
}

/// Match every indicator of `construct` against `attributes`. For each
/// indicator the highest-confidence attribute at or above `min_overlap` wins,
/// first attribute on ties.
pub fn match_construct(construct: &Construct, attributes: &[Attribute], min_overlap: f64) -> ConstructHits {
    let tokenized: Vec<BTreeSet<String>> = attributes.iter().map(|a| tokens(&a.text)).collect();
    let mut matches = Vec::new();
    let mut predicate_hit = false;

    for indicator in &construct.observable_indicators {
        let wanted = tokens(indicator);
        let mut best: Option<&Attribute> = None;
        for (attribute, attr_tokens) in attributes.iter().zip(&tokenized) {
            if overlap(&wanted, attr_tokens) < min_overlap {
                continue;
            }
            if best.map_or(true, |b| attribute.confidence > b.confidence) {
                best = Some(attribute);
            }
        }
        if let Some(attribute) = best {
            predicate_hit |= attribute.is_predicate;
            matches.push(IndicatorMatch {
                indicator: indicator.clone(),
                attribute: attribute.text.clone(),
                origin: attribute.origin.clone(),
                confidence: attribute.confidence,
            });
        }
    }
    ConstructHits {
        matches,
        predicate_hit,
    }
}
