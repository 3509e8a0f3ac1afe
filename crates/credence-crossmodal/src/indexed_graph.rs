//! Graph representation with an id index, used as the hub of every conversion.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Directed;

use credence_core::models::{GraphData, GraphEdge, GraphNode, RelationshipKey};

/// Edge payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub relation: String,
    pub weight: f64,
}

/// StableGraph of entities plus an id → NodeIndex map.
///
/// Duplicate entity ids keep the first occurrence. Relationships whose
/// endpoints are not entities, and repeated (source, relation, target)
/// keys, are dropped and counted.
#[derive(Debug, Default)]
pub struct IndexedGraph {
    pub graph: StableGraph<GraphNode, Relation, Directed>,
    node_index: HashMap<String, NodeIndex>,
    relationship_keys: BTreeSet<RelationshipKey>,
    pub dangling: usize,
    pub duplicates: usize,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, id: &str, label: &str, attributes: BTreeMap<String, String>) {
        if self.node_index.contains_key(id) {
            self.duplicates += 1;
            return;
        }
        let idx = self.graph.add_node(GraphNode {
            id: id.to_string(),
            label: label.to_string(),
            attributes,
        });
        self.node_index.insert(id.to_string(), idx);
    }

    pub fn add_relationship(&mut self, source: &str, relation: &str, target: &str, weight: f64) {
        let (Some(&from), Some(&to)) = (self.node_index.get(source), self.node_index.get(target))
        else {
            self.dangling += 1;
            return;
        };
        let key = RelationshipKey {
            source: source.to_string(),
            relation: relation.to_string(),
            target: target.to_string(),
        };
        if !self.relationship_keys.insert(key) {
            self.duplicates += 1;
            return;
        }
        self.graph.add_edge(
            from,
            to,
            Relation {
                relation: relation.to_string(),
                weight,
            },
        );
    }

    pub fn from_graph_data(data: &GraphData) -> Self {
        let mut g = Self::new();
        for node in &data.nodes {
            g.add_entity(&node.id, &node.label, node.attributes.clone());
        }
        for edge in &data.edges {
            g.add_relationship(&edge.source, &edge.relation, &edge.target, edge.weight);
        }
        g
    }

    pub fn get_node(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Relationships in insertion order as (source, target, payload).
    pub fn relationships(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, &Relation)> + '_ {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    pub fn to_graph_data(&self) -> GraphData {
        GraphData {
            nodes: self.entities().cloned().collect(),
            edges: self
                .relationships()
                .map(|(s, t, r)| GraphEdge {
                    source: s.id.clone(),
                    target: t.id.clone(),
                    relation: r.relation.clone(),
                    weight: r.weight,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_and_duplicate_relationships_are_counted() {
        let mut g = IndexedGraph::new();
        g.add_entity("a", "A", BTreeMap::new());
        g.add_entity("b", "B", BTreeMap::new());
        g.add_entity("a", "A again", BTreeMap::new());
        g.add_relationship("a", "cites", "b", 1.0);
        g.add_relationship("a", "cites", "b", 0.5);
        g.add_relationship("a", "cites", "ghost", 1.0);

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.duplicates, 2);
        assert_eq!(g.dangling, 1);
        assert_eq!(g.graph[g.get_node("a").unwrap()].label, "A");
    }

    #[test]
    fn relationships_resolve_their_endpoints() {
        let mut g = IndexedGraph::new();
        for id in ["a", "b", "c"] {
            g.add_entity(id, id, BTreeMap::new());
        }
        g.add_relationship("a", "cites", "b", 0.7);
        g.add_relationship("b", "extends", "c", 0.4);

        let edges: Vec<_> = g
            .relationships()
            .map(|(s, t, r)| (s.id.as_str(), r.relation.as_str(), t.id.as_str(), r.weight))
            .collect();
        assert_eq!(edges, [("a", "cites", "b", 0.7), ("b", "extends", "c", 0.4)]);
        assert_eq!(g.to_graph_data().edges.len(), 2);
    }
}
