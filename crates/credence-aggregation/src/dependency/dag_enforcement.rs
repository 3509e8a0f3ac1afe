//! Cycle detection over the evidence lineage graph.

use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::NodeIndex;

use super::graph::EvidenceGraph;

/// Strongly connected components with more than one node, i.e. cycles.
pub fn find_cycles(graph: &EvidenceGraph) -> Vec<Vec<NodeIndex>> {
    tarjan_scc(&graph.graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .collect()
}
