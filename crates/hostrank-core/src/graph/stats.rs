//! Structural summary of a host graph.
//!
//! # Statistics Provided
//!
//! - **node_count** / **edge_count**: hosts and distinct directed edges.
//! - **flow_count**: records accepted by the build (including dropped loops).
//! - **self_loop_count**: loop edges present in the graph.
//! - **density**: `edge_count / (node_count * (node_count - 1))`, 0.0 for
//!   graphs with fewer than two hosts. Loops are excluded from the numerator.
//! - **weakly_connected_component_count**: disjoint subgraphs when edge
//!   direction is ignored.
//! - **scc_count**: strongly connected components.
//! - **has_cycle**: whether any directed cycle exists (a loop counts).
//! - **isolated_node_count**: hosts with no incident edge at all.

use petgraph::algo::{connected_components, is_cyclic_directed, tarjan_scc};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::graph::build::HostGraph;

/// Summary statistics for a [`HostGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub flow_count: usize,
    pub self_loop_count: usize,
    pub dropped_self_loops: usize,
    pub density: f64,
    pub weakly_connected_component_count: usize,
    pub scc_count: usize,
    pub has_cycle: bool,
    pub isolated_node_count: usize,
    /// Content hash copied from the graph for cache comparisons.
    pub content_hash: String,
}

impl GraphSummary {
    /// Compute statistics for a built graph.
    #[must_use]
    pub fn from_graph(hg: &HostGraph) -> Self {
        let g = &hg.graph;
        let node_count = g.node_count();
        let edge_count = g.edge_count();

        let self_loop_count = g
            .edge_references()
            .filter(|e| e.source() == e.target())
            .count();

        let isolated_node_count = g
            .node_indices()
            .filter(|&idx| g.neighbors_undirected(idx).next().is_none())
            .count();

        Self {
            node_count,
            edge_count,
            flow_count: hg.flow_count,
            self_loop_count,
            dropped_self_loops: hg.dropped_self_loops,
            density: compute_density(node_count, edge_count - self_loop_count),
            weakly_connected_component_count: connected_components(g),
            scc_count: tarjan_scc(g).len(),
            has_cycle: is_cyclic_directed(g),
            isolated_node_count,
            content_hash: hg.content_hash.clone(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    edge_count as f64 / (node_count * (node_count - 1)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowRecord;
    use crate::graph::build::{GraphBuildOptions, SelfLoopPolicy, build_graph};

    fn summary(pairs: &[(&str, &str)], self_loops: SelfLoopPolicy) -> GraphSummary {
        let records: Vec<FlowRecord> = pairs.iter().map(|&p| p.into()).collect();
        let hg = build_graph(&records, &GraphBuildOptions { self_loops }).expect("build");
        GraphSummary::from_graph(&hg)
    }

    #[test]
    fn empty_graph_summary() {
        let s = summary(&[], SelfLoopPolicy::Keep);
        assert_eq!(s.node_count, 0);
        assert_eq!(s.weakly_connected_component_count, 0);
        assert!(!s.has_cycle);
        assert!((s.density - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn triangle_is_one_cyclic_component() {
        let s = summary(&[("A", "B"), ("B", "C"), ("C", "A")], SelfLoopPolicy::Keep);
        assert_eq!(s.node_count, 3);
        assert_eq!(s.edge_count, 3);
        assert_eq!(s.scc_count, 1);
        assert_eq!(s.weakly_connected_component_count, 1);
        assert!(s.has_cycle);
        // 3 / (3 * 2)
        assert!((s.density - 0.5).abs() < 1e-12);
    }

    #[test]
    fn self_loop_counts_as_cycle() {
        let s = summary(&[("A", "A"), ("A", "B")], SelfLoopPolicy::Keep);
        assert_eq!(s.self_loop_count, 1);
        assert!(s.has_cycle);
    }

    #[test]
    fn dropped_loop_leaves_isolated_host() {
        let s = summary(&[("A", "B"), ("Z", "Z")], SelfLoopPolicy::Drop);
        assert_eq!(s.isolated_node_count, 1);
        assert_eq!(s.dropped_self_loops, 1);
        assert_eq!(s.flow_count, 2);
        assert_eq!(s.weakly_connected_component_count, 2);
        assert!(!s.has_cycle);
    }
}
