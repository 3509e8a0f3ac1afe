//! Pure, replayable scope resolution.

use serde::{Deserialize, Serialize};

use credence_core::config::ResolutionConfig;
use credence_core::errors::ResolutionError;
use credence_core::models::EntityReference;
use credence_observability::resolution_span;

use crate::cue::ScopeEvent;
use crate::outcome::ScopeResolution;
use crate::resolver::ScopeResolver;

/// Complete, ordered input of one document/speaker scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeInput {
    pub scope: String,
    pub candidates: Vec<String>,
    pub references: Vec<EntityReference>,
    #[serde(default)]
    pub events: Vec<ScopeEvent>,
}

/// Register every reference, replay every event in order, and finalize.
///
/// Depends only on its arguments: identical input yields identical output.
pub fn resolve_scope(
    input: &ScopeInput,
    config: &ResolutionConfig,
) -> Result<ScopeResolution, ResolutionError> {
    let _span = resolution_span!(input.scope).entered();

    let mut resolver = ScopeResolver::new(&input.scope, input.candidates.iter(), config)?;
    for reference in &input.references {
        resolver.register(reference.clone())?;
    }
    for event in &input.events {
        resolver.apply(event)?;
    }
    resolver.finalize()
}
