//! Deterministic structural converter between graph, table, and vector formats.

use std::collections::BTreeMap;

use tracing::debug;

use credence_core::config::CrossModalConfig;
use credence_core::errors::CredenceResult;
use credence_core::models::{
    EntityRow, Format, RelationVector, RelationshipRow, Representation, TableData, VectorData,
    VectorEntry,
};
use credence_core::traits::IFormatConverter;

use crate::embedding::{hashed_embedding, is_usable};
use crate::indexed_graph::IndexedGraph;

/// Converts through an [`IndexedGraph`] hub.
///
/// Entity vectors are content-hashed from `id` and `label`; relation vectors
/// are the target embedding minus the source embedding. Attributes do not
/// survive a trip through the vector format. Entries with unusable vectors
/// and relationships with missing endpoints are dropped.
#[derive(Debug, Clone)]
pub struct StructuralConverter {
    dimensions: usize,
}

impl StructuralConverter {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn from_config(config: &CrossModalConfig) -> Self {
        Self::new(config.vector_dimensions)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn hub_of(&self, input: &Representation) -> IndexedGraph {
        match input {
            Representation::Graph(data) => IndexedGraph::from_graph_data(data),
            Representation::Table(table) => {
                let mut g = IndexedGraph::new();
                for row in &table.entity_rows {
                    g.add_entity(&row.id, &row.label, row.attributes.clone());
                }
                for row in &table.relationship_rows {
                    g.add_relationship(&row.source, &row.relation, &row.target, row.weight);
                }
                g
            }
            Representation::Vector(vectors) => {
                let mut g = IndexedGraph::new();
                let mut unusable = 0usize;
                for entry in &vectors.entries {
                    if is_usable(&entry.vector, vectors.dimensions) {
                        g.add_entity(&entry.id, &entry.label, BTreeMap::new());
                    } else {
                        unusable += 1;
                    }
                }
                for rel in &vectors.relations {
                    g.add_relationship(&rel.source, &rel.relation, &rel.target, rel.weight);
                }
                if unusable > 0 {
                    debug!(unusable, "dropped vector entries without a usable embedding");
                }
                g
            }
        }
    }

    fn render(&self, hub: &IndexedGraph, target: Format) -> Representation {
        match target {
            Format::Graph => Representation::Graph(hub.to_graph_data()),
            Format::Table => Representation::Table(TableData {
                entity_rows: hub
                    .entities()
                    .map(|n| EntityRow {
                        id: n.id.clone(),
                        label: n.label.clone(),
                        attributes: n.attributes.clone(),
                    })
                    .collect(),
                relationship_rows: hub
                    .relationships()
                    .map(|(s, t, r)| RelationshipRow {
                        source: s.id.clone(),
                        relation: r.relation.clone(),
                        target: t.id.clone(),
                        weight: r.weight,
                    })
                    .collect(),
            }),
            Format::Vector => {
                let embed = |id: &str, label: &str| {
                    hashed_embedding(&format!("{id}\u{1f}{label}"), self.dimensions)
                };
                let entries: Vec<VectorEntry> = hub
                    .entities()
                    .map(|n| VectorEntry {
                        id: n.id.clone(),
                        label: n.label.clone(),
                        vector: embed(&n.id, &n.label),
                    })
                    .filter(|e| is_usable(&e.vector, self.dimensions))
                    .collect();
                let by_id: BTreeMap<&str, &[f32]> = entries
                    .iter()
                    .map(|e| (e.id.as_str(), e.vector.as_slice()))
                    .collect();
                let relations = hub
                    .relationships()
                    .filter_map(|(s, t, r)| {
                        let (from, to) = (by_id.get(s.id.as_str())?, by_id.get(t.id.as_str())?);
                        Some(RelationVector {
                            source: s.id.clone(),
                            relation: r.relation.clone(),
                            target: t.id.clone(),
                            weight: r.weight,
                            vector: to.iter().zip(from.iter()).map(|(b, a)| b - a).collect(),
                        })
                    })
                    .collect();
                Representation::Vector(VectorData {
                    dimensions: self.dimensions,
                    entries,
                    relations,
                })
            }
        }
    }
}

impl Default for StructuralConverter {
    fn default() -> Self {
        Self::from_config(&CrossModalConfig::default())
    }
}

impl IFormatConverter for StructuralConverter {
    fn convert(&self, input: &Representation, target: Format) -> CredenceResult<Representation> {
        if input.format() == target {
            return Ok(input.clone());
        }
        let hub = self.hub_of(input);
        if hub.dangling > 0 || hub.duplicates > 0 {
            debug!(
                from = %input.format(),
                to = %target,
                dangling = hub.dangling,
                duplicates = hub.duplicates,
                "dropped records during conversion"
            );
        }
        Ok(self.render(&hub, target))
    }

    fn name(&self) -> &str {
        "structural"
    }
}
