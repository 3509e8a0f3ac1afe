//! Graph representation of aggregated claims.

use std::collections::{BTreeMap, BTreeSet};

use credence_core::constants::UNRESOLVED_ENTITY_PREFIX;
use credence_core::models::{Claim, GraphData, GraphEdge, GraphNode};

/// One node per distinct subject or object entity (sorted by id), one edge
/// per claim weighted by its adjusted confidence.
pub fn claims_to_graph(claims: &[Claim]) -> GraphData {
    let entities: BTreeSet<&str> = claims
        .iter()
        .flat_map(|c| [c.subject_entity.as_str(), c.object_entity.as_str()])
        .collect();

    let nodes = entities
        .into_iter()
        .map(|id| {
            let mut attributes = BTreeMap::new();
            let resolved = !id.starts_with(UNRESOLVED_ENTITY_PREFIX);
            attributes.insert("resolved".to_string(), resolved.to_string());
            GraphNode {
                id: id.to_string(),
                label: id.to_string(),
                attributes,
            }
        })
        .collect();

    let edges = claims
        .iter()
        .map(|c| GraphEdge {
            source: c.subject_entity.clone(),
            target: c.object_entity.clone(),
            relation: c.predicate.clone(),
            weight: c.adjusted_confidence,
        })
        .collect();

    GraphData { nodes, edges }
}
