//! Probability distribution over a fixed candidate set plus Unknown.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use credence_core::constants::PROBABILITY_EPSILON;
use credence_core::models::CandidateProbability;

/// Candidate probabilities and the residual Unknown mass. Always sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub candidates: BTreeMap<String, f64>,
    pub unknown: f64,
}

impl Distribution {
    /// Equal mass on every candidate and on Unknown.
    pub fn uniform(candidates: &BTreeSet<String>) -> Self {
        let share = 1.0 / (candidates.len() as f64 + 1.0);
        Self {
            candidates: candidates.iter().map(|c| (c.clone(), share)).collect(),
            unknown: share,
        }
    }

    /// Distribution seeded from upstream candidate probabilities; the
    /// remainder goes to Unknown, candidates not listed start at zero.
    pub fn from_candidates(
        seed: &[CandidateProbability],
        known: &BTreeSet<String>,
    ) -> Result<Self, String> {
        let mut candidates: BTreeMap<String, f64> =
            known.iter().map(|c| (c.clone(), 0.0)).collect();
        for c in seed {
            if !c.probability.is_finite() || c.probability < 0.0 {
                return Err(format!(
                    "probability {} for '{}' is not a finite non-negative value",
                    c.probability, c.entity_id
                ));
            }
            match candidates.get_mut(&c.entity_id) {
                Some(p) => *p += c.probability,
                None => return Err(format!("'{}' is not a scope candidate", c.entity_id)),
            }
        }
        let assigned: f64 = candidates.values().sum();
        if assigned > 1.0 + PROBABILITY_EPSILON {
            return Err(format!("candidate probabilities sum to {assigned} > 1"));
        }
        Ok(Self {
            candidates,
            unknown: (1.0 - assigned).max(0.0),
        })
    }

    /// Bayesian update. `likelihood(Some(id))` is the likelihood for a
    /// candidate, `likelihood(None)` for Unknown. Returns `None` when the
    /// update leaves no probability mass.
    pub fn update<F>(&self, likelihood: F) -> Option<Self>
    where
        F: Fn(Option<&str>) -> f64,
    {
        let candidates: BTreeMap<String, f64> = self
            .candidates
            .iter()
            .map(|(id, p)| (id.clone(), p * likelihood(Some(id))))
            .collect();
        let unknown = self.unknown * likelihood(None);
        Self { candidates, unknown }.normalized()
    }

    /// Zero one candidate and renormalize. `None` if nothing remains.
    pub fn exclude(&self, entity_id: &str) -> Option<Self> {
        let mut next = self.clone();
        if let Some(p) = next.candidates.get_mut(entity_id) {
            *p = 0.0;
        }
        next.normalized()
    }

    fn normalized(mut self) -> Option<Self> {
        let total = self.mass();
        if !total.is_finite() || total <= PROBABILITY_EPSILON {
            return None;
        }
        for p in self.candidates.values_mut() {
            *p /= total;
        }
        self.unknown /= total;
        Some(self)
    }

    pub fn mass(&self) -> f64 {
        self.candidates.values().sum::<f64>() + self.unknown
    }

    pub fn probability_of(&self, entity_id: &str) -> f64 {
        self.candidates.get(entity_id).copied().unwrap_or(0.0)
    }

    /// Highest-probability candidate. Ties go to the smaller id; Unknown is never a top candidate.
    pub fn top(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (id, p) in &self.candidates {
            if best.map_or(true, |(_, bp)| *p > bp) {
                best = Some((id.as_str(), *p));
            }
        }
        best
    }

    pub fn to_candidates(&self) -> Vec<CandidateProbability> {
        self.candidates
            .iter()
            .map(|(id, p)| CandidateProbability {
                entity_id: id.clone(),
                probability: *p,
            })
            .collect()
    }
}
