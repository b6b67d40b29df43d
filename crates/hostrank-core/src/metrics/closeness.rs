//! Closeness centrality over reachable hosts.
//!
//! # Definition
//!
//! For each host `v`, run an unweighted BFS. With `r` the number of hosts
//! reachable from `v` (excluding `v`) and `s` the sum of their hop
//! distances:
//!
//! ```text
//! closeness(v) = r / s        (0 when r = 0)
//! ```
//!
//! i.e. the inverse of the average distance to the hosts `v` can actually
//! reach. Unreachable hosts are ignored instead of making the distance
//! infinite, so disconnected captures (the normal case) are well defined.
//!
//! # Direction
//!
//! [`ClosenessDirection::Out`] follows flows from the host,
//! [`ClosenessDirection::In`] follows them backwards and
//! [`ClosenessDirection::All`] ignores direction.
//!
//! # Complexity
//!
//! - Time: O(V × (V + E))
//! - Space: O(V)

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::graph::build::HostGraph;

/// Which way BFS follows edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosenessDirection {
    #[default]
    Out,
    In,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosenessConfig {
    #[serde(default)]
    pub direction: ClosenessDirection,
}

/// Compute closeness centrality for every vertex.
#[must_use]
#[instrument(skip(hg), fields(nodes = hg.node_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn closeness_centrality(hg: &HostGraph, config: &ClosenessConfig) -> Vec<f64> {
    let n = hg.node_count();
    let mut visited = FixedBitSet::with_capacity(n);
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();

    hg.graph
        .node_indices()
        .map(|source| {
            let (reached, distance_sum) =
                bfs_from(hg, source, config.direction, &mut visited, &mut queue);
            if reached == 0 {
                0.0
            } else {
                reached as f64 / distance_sum as f64
            }
        })
        .collect()
}

/// BFS from `source`; returns (reachable count, sum of hop distances).
fn bfs_from(
    hg: &HostGraph,
    source: NodeIndex,
    direction: ClosenessDirection,
    visited: &mut FixedBitSet,
    queue: &mut VecDeque<(NodeIndex, usize)>,
) -> (usize, usize) {
    let g = &hg.graph;
    visited.clear();
    queue.clear();

    visited.insert(source.index());
    queue.push_back((source, 0));

    let mut reached = 0usize;
    let mut distance_sum = 0usize;

    while let Some((node, dist)) = queue.pop_front() {
        let mut visit = |next: NodeIndex| {
            if !visited.put(next.index()) {
                reached += 1;
                distance_sum += dist + 1;
                queue.push_back((next, dist + 1));
            }
        };
        match direction {
            ClosenessDirection::Out => g
                .neighbors_directed(node, Direction::Outgoing)
                .for_each(&mut visit),
            ClosenessDirection::In => g
                .neighbors_directed(node, Direction::Incoming)
                .for_each(&mut visit),
            ClosenessDirection::All => g.neighbors_undirected(node).for_each(&mut visit),
        }
    }

    (reached, distance_sum)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
