//! Textual cues and the likelihood table keyed on cue type.

use serde::{Deserialize, Serialize};

use credence_core::config::ResolutionConfig;
use credence_core::models::ReferenceConstraint;

/// A textual cue about which entity a reference denotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cue {
    /// The speaker names themselves ("I, as the Bristol group lead, ...").
    SelfIdentification { entity_id: String },
    /// The reference is framed against an in-group denoted by another reference.
    Oppositional { in_group_ref: String },
    /// The reference is mentioned alongside an entity with the given strength in [0, 1].
    Associative { entity_id: String, strength: f64 },
    /// Recorded for the audit trail; carries no information.
    Neutral,
}

impl Cue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SelfIdentification { .. } => "self_identification",
            Self::Oppositional { .. } => "oppositional",
            Self::Associative { .. } => "associative",
            Self::Neutral => "neutral",
        }
    }
}

/// A cue observed for one reference, with the text that carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueEvent {
    pub ref_id: String,
    pub evidence_text: String,
    pub cue: Cue,
}

impl CueEvent {
    pub fn new(ref_id: impl Into<String>, evidence_text: impl Into<String>, cue: Cue) -> Self {
        Self {
            ref_id: ref_id.into(),
            evidence_text: evidence_text.into(),
            cue,
        }
    }
}

/// One ordered input to a resolution scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScopeEvent {
    Cue(CueEvent),
    Constraint {
        ref_id: String,
        constraint: ReferenceConstraint,
    },
}

/// Likelihood of `cue` for a candidate (`Some(id)`) or for Unknown (`None`).
///
/// `in_group` is the entity the oppositional in-group reference resolved to.
pub(crate) fn likelihood(
    config: &ResolutionConfig,
    cue: &Cue,
    in_group: Option<&str>,
    candidate: Option<&str>,
) -> f64 {
    match cue {
        Cue::SelfIdentification { entity_id } => {
            if candidate == Some(entity_id.as_str()) {
                config.self_identification_match
            } else {
                config.self_identification_mismatch
            }
        }
        Cue::Oppositional { .. } => match (in_group, candidate) {
            (Some(group), Some(c)) if group == c => config.oppositional_in_group,
            _ => 1.0,
        },
        Cue::Associative { entity_id, strength } => {
            let matched = associative_match(config, *strength);
            if candidate == Some(entity_id.as_str()) {
                matched
            } else {
                1.0 - matched
            }
        }
        Cue::Neutral => 1.0,
    }
}

/// Likelihood an associative cue assigns its entity: 0.5 at zero strength,
/// rising linearly and capped at the configured ceiling.
fn associative_match(config: &ResolutionConfig, strength: f64) -> f64 {
    (0.5 + 0.5 * strength).min(config.associative_ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_identification_is_near_deterministic() {
        let config = ResolutionConfig::default();
        let cue = Cue::SelfIdentification {
            entity_id: "e1".into(),
        };
        assert_eq!(likelihood(&config, &cue, None, Some("e1")), 0.98);
        assert_eq!(likelihood(&config, &cue, None, Some("e2")), 0.02);
        assert_eq!(likelihood(&config, &cue, None, None), 0.02);
    }

    #[test]
    fn associative_is_capped() {
        let config = ResolutionConfig::default();
        let cue = Cue::Associative {
            entity_id: "e1".into(),
            strength: 1.0,
        };
        assert!((likelihood(&config, &cue, None, Some("e1")) - 0.8).abs() < 1e-12);
        assert!((likelihood(&config, &cue, None, Some("e2")) - 0.2).abs() < 1e-12);
    }
}
