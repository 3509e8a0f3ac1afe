//! Evidence lineage graph: StableGraph + id → NodeIndex lookup.
//!
//! Edges point from a derived item to the item it depends on.

use std::collections::{BTreeSet, HashMap};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;

use credence_core::errors::AggregationError;
use credence_core::models::DependencyDescriptor;

use super::dag_enforcement;

pub struct EvidenceGraph {
    pub graph: StableGraph<String, f64, Directed>,
    node_index: HashMap<String, NodeIndex>,
}

impl EvidenceGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Build and validate the lineage graph for `evidence_ids`.
    ///
    /// Rejects duplicate evidence ids, references to unknown ids, self
    /// dependence, strengths or correlations outside [0, 1], and cycles.
    pub fn build(
        evidence_ids: &[&str],
        descriptor: &DependencyDescriptor,
    ) -> Result<Self, AggregationError> {
        let mut graph = Self::new();
        for id in evidence_ids {
            if graph.node_index.contains_key(*id) {
                return Err(invalid(format!("duplicate evidence id '{id}'")));
            }
            let idx = graph.graph.add_node((*id).to_string());
            graph.node_index.insert((*id).to_string(), idx);
        }

        for edge in &descriptor.depends_on {
            if edge.evidence_id == edge.depends_on {
                return Err(invalid(format!(
                    "'{}' is declared to depend on itself",
                    edge.evidence_id
                )));
            }
            unit_interval(&format!("strength of {} -> {}", edge.evidence_id, edge.depends_on), edge.strength)?;
            let from = graph.require(&edge.evidence_id)?;
            let to = graph.require(&edge.depends_on)?;
            graph.graph.add_edge(from, to, edge.strength);
        }

        for (i, group) in descriptor.groups.iter().enumerate() {
            unit_interval(&format!("correlation of group {i}"), group.correlation)?;
            let mut seen = BTreeSet::new();
            for member in &group.members {
                graph.require(member)?;
                if !seen.insert(member.as_str()) {
                    return Err(invalid(format!("group {i} lists '{member}' twice")));
                }
            }
        }

        let cycles = dag_enforcement::find_cycles(&graph);
        if let Some(cycle) = cycles.first() {
            let mut names: Vec<&str> = cycle
                .iter()
                .filter_map(|idx| graph.graph.node_weight(*idx).map(String::as_str))
                .collect();
            names.sort_unstable();
            return Err(invalid(format!(
                "depends_on forms a cycle through {}",
                names.join(", ")
            )));
        }

        Ok(graph)
    }

    pub fn get_node(&self, evidence_id: &str) -> Option<NodeIndex> {
        self.node_index.get(evidence_id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn require(&self, evidence_id: &str) -> Result<NodeIndex, AggregationError> {
        self.get_node(evidence_id)
            .ok_or_else(|| invalid(format!("unknown evidence id '{evidence_id}'")))
    }
}

impl Default for EvidenceGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(reason: String) -> AggregationError {
    AggregationError::InvalidDependencyGraph { reason }
}

fn unit_interval(what: &str, value: f64) -> Result<(), AggregationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{what} = {value} is outside [0, 1]")))
    }
}
