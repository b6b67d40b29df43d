//! Host graph construction from flow records.
//!
//! # Overview
//!
//! Every distinct host identifier becomes one vertex and every flow adds a
//! directed edge `source → destination`. The graph is built in three steps:
//!
//! 1. Validate all records (an empty identifier fails the whole build).
//! 2. Add vertices in first-seen order over the source column followed by
//!    the destination column.
//! 3. Insert edges in record order.
//!
//! ## Multiplicity
//!
//! Repeated flows between the same ordered pair are folded into a single
//! edge whose weight counts the flows. Degrees, PageRank transition shares
//! and the alpha-centrality adjacency all read that weight, so no flow is
//! lost by the folding.
//!
//! ## Self-Loops
//!
//! [`SelfLoopPolicy::Keep`] inserts `A → A` like any other flow.
//! [`SelfLoopPolicy::Drop`] skips the edge but the host still becomes a
//! vertex, so the vertex set is always the union of both columns.
//!
//! ## Content Hash
//!
//! [`HostGraph::content_hash`] is a BLAKE3 hash of the sorted, weighted edge
//! list. Two builds over the same flows produce the same hash.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{AnalysisError, FlowField};
use crate::flow::FlowRecord;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with flows whose source and destination are the same host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
    /// Insert the loop edge.
    #[default]
    Keep,
    /// Skip the loop edge (the host is still a vertex).
    Drop,
}

/// Options controlling graph construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphBuildOptions {
    #[serde(default)]
    pub self_loops: SelfLoopPolicy,
}

// ---------------------------------------------------------------------------
// HostGraph
// ---------------------------------------------------------------------------

/// A directed host-interaction graph.
///
/// Nodes are host identifiers. An edge `A → B` with weight `w` means `w`
/// flows were observed from `A` to `B`.
#[derive(Debug, Clone)]
pub struct HostGraph {
    /// Directed graph: nodes = hosts, edge weight = flow multiplicity.
    pub graph: DiGraph<String, u32>,
    /// Mapping from host identifier to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// Number of flow records accepted by the build.
    pub flow_count: usize,
    /// Number of self-loop flows skipped under [`SelfLoopPolicy::Drop`].
    pub dropped_self_loops: usize,
    /// BLAKE3 content hash of the weighted edge set.
    pub content_hash: String,
}

impl HostGraph {
    /// Return the number of vertices (hosts).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of distinct directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sum of all edge weights (flows that produced an edge).
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.graph.edge_weights().map(|&w| u64::from(w)).sum()
    }

    /// Look up the `NodeIndex` for a host.
    #[must_use]
    pub fn node_index(&self, host: &str) -> Option<NodeIndex> {
        self.node_map.get(host).copied()
    }

    /// Return the host label for a node.
    #[must_use]
    pub fn host(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Hosts in vertex insertion order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Flow multiplicity of the edge `from → to`, or 0 when absent.
    #[must_use]
    pub fn flows_between(&self, from: &str, to: &str) -> u32 {
        let (Some(a), Some(b)) = (self.node_index(from), self.node_index(to)) else {
            return 0;
        };
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
            .unwrap_or(0)
    }
}

/// Build a [`HostGraph`] from flow records.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedInput`] for the first record whose
/// source or destination identifier is empty. Nothing is built in that case.
#[instrument(skip(records), fields(records = records.len()))]
pub fn build_graph(
    records: &[FlowRecord],
    options: &GraphBuildOptions,
) -> Result<HostGraph, AnalysisError> {
    // Step 1: reject malformed records before touching the graph.
    validate_records(records)?;

    // Step 2: vertices, source column first, then destination column.
    let mut graph = DiGraph::<String, u32>::with_capacity(records.len(), records.len());
    let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(records.len());

    let column_order = records
        .iter()
        .map(|r| r.source_host.as_str())
        .chain(records.iter().map(|r| r.dest_host.as_str()));
    for host in column_order {
        if !node_map.contains_key(host) {
            let idx = graph.add_node(host.to_string());
            node_map.insert(host.to_string(), idx);
        }
    }

    // Step 3: edges in record order. Parallel flows bump the weight.
    // Hub hosts can have huge out-degree, so existing edges are found
    // through a hashed pair index rather than `find_edge`.
    let mut edge_map: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();
    let mut dropped_self_loops = 0usize;

    for record in records {
        let src = node_map[record.source_host.as_str()];
        let dst = node_map[record.dest_host.as_str()];

        if src == dst && options.self_loops == SelfLoopPolicy::Drop {
            dropped_self_loops += 1;
            continue;
        }

        record_flow(&mut graph, &mut edge_map, src, dst);
    }

    let content_hash = compute_edge_hash(&graph);

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped_self_loops,
        "host graph built"
    );

    Ok(HostGraph {
        graph,
        node_map,
        flow_count: records.len(),
        dropped_self_loops,
        content_hash,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Add one flow `src → dst`: a new edge of weight 1, or one more on the
/// existing edge. Weights saturate at `u32::MAX`.
fn record_flow(
    graph: &mut DiGraph<String, u32>,
    edge_map: &mut HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
    src: NodeIndex,
    dst: NodeIndex,
) {
    match edge_map.get(&(src, dst)) {
        Some(&edge) => graph[edge] = graph[edge].saturating_add(1),
        None => {
            let edge = graph.add_edge(src, dst, 1);
            edge_map.insert((src, dst), edge);
        }
    }
}

fn validate_records(records: &[FlowRecord]) -> Result<(), AnalysisError> {
    for (record, flow) in records.iter().enumerate() {
        if flow.source_host.trim().is_empty() {
            return Err(AnalysisError::MalformedInput {
                record,
                field: FlowField::Source,
            });
        }
        if flow.dest_host.trim().is_empty() {
            return Err(AnalysisError::MalformedInput {
                record,
                field: FlowField::Destination,
            });
        }
    }
    Ok(())
}

/// Compute a BLAKE3 hash of the sorted weighted edge list.
fn compute_edge_hash(graph: &DiGraph<String, u32>) -> String {
    let mut edges: Vec<(&str, &str, u32)> = graph
        .edge_references()
        .map(|e| {
            (
                graph[e.source()].as_str(),
                graph[e.target()].as_str(),
                *e.weight(),
            )
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (src, dst, weight) in edges {
        hasher.update(src.as_bytes());
        hasher.update(b"\x00");
        hasher.update(dst.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&weight.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn flows(pairs: &[(&str, &str)]) -> Vec<FlowRecord> {
        pairs.iter().map(|&(s, d)| FlowRecord::new(s, d)).collect()
    }

    fn build(pairs: &[(&str, &str)]) -> HostGraph {
        build_graph(&flows(pairs), &GraphBuildOptions::default()).expect("build graph")
    }

    #[test]
    fn empty_input_produces_empty_graph() {
        let graph = build(&[]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.flow_count, 0);
        assert!(graph.content_hash.starts_with("blake3:"));
    }

    #[test]
    fn triangle_has_three_vertices_and_edges() {
        let graph = build(&[("A", "B"), ("B", "C"), ("C", "A")]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.flows_between("A", "B"), 1);
        assert_eq!(graph.flows_between("B", "A"), 0);
    }

    #[test]
    fn vertex_order_is_source_column_then_destination_column() {
        let graph = build(&[("A", "X"), ("B", "A"), ("C", "Y")]);
        let hosts: Vec<&str> = graph.hosts().collect();
        assert_eq!(hosts, vec!["A", "B", "C", "X", "Y"]);
    }

    #[test]
    fn parallel_flows_fold_into_weight() {
        let graph = build(&[("A", "B"), ("A", "B"), ("A", "B"), ("B", "A")]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.flows_between("A", "B"), 3);
        assert_eq!(graph.flows_between("B", "A"), 1);
        assert_eq!(graph.total_weight(), 4);
    }

    #[test]
    fn self_loops_kept_by_default() {
        let graph = build(&[("A", "A"), ("A", "B")]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.flows_between("A", "A"), 1);
        assert_eq!(graph.dropped_self_loops, 0);
    }

    #[test]
    fn dropped_self_loop_host_is_still_a_vertex() {
        let options = GraphBuildOptions {
            self_loops: SelfLoopPolicy::Drop,
        };
        let graph = build_graph(&flows(&[("A", "B"), ("Z", "Z")]), &options).expect("build");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dropped_self_loops, 1);
        let z = graph.node_index("Z").expect("Z vertex");
        assert_eq!(graph.graph.edges(z).count(), 0);
    }

    #[test]
    fn empty_source_is_malformed() {
        let err = build_graph(&flows(&[("A", "B"), ("", "C")]), &GraphBuildOptions::default())
            .expect_err("empty source must fail");
        assert_eq!(
            err,
            AnalysisError::MalformedInput {
                record: 1,
                field: FlowField::Source
            }
        );
    }

    #[test]
    fn whitespace_destination_is_malformed() {
        let err = build_graph(&flows(&[("A", "  ")]), &GraphBuildOptions::default())
            .expect_err("blank destination must fail");
        assert_eq!(
            err,
            AnalysisError::MalformedInput {
                record: 0,
                field: FlowField::Destination
            }
        );
    }

    #[test]
    fn content_hash_ignores_record_order() {
        let a = build(&[("A", "B"), ("B", "C")]);
        let b = build(&[("B", "C"), ("A", "B")]);
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn edge_weight_saturates_instead_of_overflowing() {
        let mut graph = DiGraph::<String, u32>::new();
        let a = graph.add_node("A".into());
        let b = graph.add_node("B".into());
        let mut edge_map = HashMap::new();

        record_flow(&mut graph, &mut edge_map, a, b);
        let edge = edge_map[&(a, b)];
        graph[edge] = u32::MAX - 1;
        record_flow(&mut graph, &mut edge_map, a, b);
        record_flow(&mut graph, &mut edge_map, a, b);

        assert_eq!(graph[edge], u32::MAX);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn content_hash_tracks_multiplicity() {
        let once = build(&[("A", "B")]);
        let twice = build(&[("A", "B"), ("A", "B")]);
        assert_ne!(once.content_hash, twice.content_hash);
    }
}
