//! Degree centrality: flows in, flows out, and their sum.
//!
//! # Overview
//!
//! Degrees are weighted by flow multiplicity, so a host that opened 40
//! connections to the same peer has out-degree 40, exactly as if every
//! flow were its own edge. A self-loop contributes one to the in-degree and
//! one to the out-degree, which keeps `degree = in_degree + out_degree`.
//!
//! # Normalization
//!
//! [`DegreeNormalization::Max`] divides each of the three vectors by its own
//! maximum. An edgeless graph has maximum 0; it is treated as 1 so every
//! score stays 0 instead of dividing by zero.

use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::graph::build::HostGraph;

/// How degree values are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeNormalization {
    /// Raw weighted counts.
    #[default]
    Raw,
    /// Divide by the maximum observed value.
    Max,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeConfig {
    #[serde(default)]
    pub normalization: DegreeNormalization,
}

/// Per-vertex degree vectors, positioned by vertex index.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeCentrality {
    /// Flows received.
    pub in_degree: Vec<f64>,
    /// Flows sent.
    pub out_degree: Vec<f64>,
    /// `in_degree + out_degree`.
    pub total_degree: Vec<f64>,
}

/// Raw weighted in/out degree, as flow counts.
#[must_use]
pub fn weighted_degrees(hg: &HostGraph) -> (Vec<u64>, Vec<u64>) {
    let g = &hg.graph;
    let sum = |idx, dir| {
        g.edges_directed(idx, dir)
            .map(|e| u64::from(*e.weight()))
            .sum::<u64>()
    };
    g.node_indices()
        .map(|idx| (sum(idx, Direction::Incoming), sum(idx, Direction::Outgoing)))
        .unzip()
}

/// Compute degree centrality for every vertex.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn degree_centrality(hg: &HostGraph, config: &DegreeConfig) -> DegreeCentrality {
    let (in_raw, out_raw) = weighted_degrees(hg);

    let in_degree: Vec<f64> = in_raw.iter().map(|&d| d as f64).collect();
    let out_degree: Vec<f64> = out_raw.iter().map(|&d| d as f64).collect();
    let total_degree: Vec<f64> = in_raw
        .iter()
        .zip(&out_raw)
        .map(|(&i, &o)| (i + o) as f64)
        .collect();

    match config.normalization {
        DegreeNormalization::Raw => DegreeCentrality {
            in_degree,
            out_degree,
            total_degree,
        },
        DegreeNormalization::Max => DegreeCentrality {
            in_degree: scale_by_max(in_degree),
            out_degree: scale_by_max(out_degree),
            total_degree: scale_by_max(total_degree),
        },
    }
}

fn scale_by_max(mut values: Vec<f64>) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };
    for v in &mut values {
        *v /= max;
    }
    values
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowRecord;
    use crate::graph::build::{GraphBuildOptions, SelfLoopPolicy, build_graph};

    fn graph(pairs: &[(&str, &str)]) -> HostGraph {
        let records: Vec<FlowRecord> = pairs.iter().map(|&p| p.into()).collect();
        build_graph(&records, &GraphBuildOptions::default()).expect("build")
    }

    fn at(hg: &HostGraph, values: &[f64], host: &str) -> f64 {
        values[hg.node_index(host).expect("host").index()]
    }

    #[test]
    fn empty_graph() {
        let dc = degree_centrality(&graph(&[]), &DegreeConfig::default());
        assert!(dc.in_degree.is_empty());
        assert!(dc.total_degree.is_empty());
    }

    #[test]
    fn linear_chain() {
        // A → B → C
        let hg = graph(&[("A", "B"), ("B", "C")]);
        let dc = degree_centrality(&hg, &DegreeConfig::default());

        assert_eq!(at(&hg, &dc.in_degree, "A"), 0.0);
        assert_eq!(at(&hg, &dc.out_degree, "A"), 1.0);
        assert_eq!(at(&hg, &dc.total_degree, "B"), 2.0);
        assert_eq!(at(&hg, &dc.in_degree, "C"), 1.0);
        assert_eq!(at(&hg, &dc.out_degree, "C"), 0.0);
    }

    #[test]
    fn repeated_flows_count_individually() {
        let hg = graph(&[("A", "B"), ("A", "B"), ("A", "B")]);
        let dc = degree_centrality(&hg, &DegreeConfig::default());
        assert_eq!(at(&hg, &dc.out_degree, "A"), 3.0);
        assert_eq!(at(&hg, &dc.in_degree, "B"), 3.0);
    }

    #[test]
    fn self_loop_counts_on_both_sides() {
        let hg = graph(&[("A", "A")]);
        let dc = degree_centrality(&hg, &DegreeConfig::default());
        assert_eq!(dc.in_degree, vec![1.0]);
        assert_eq!(dc.out_degree, vec![1.0]);
        assert_eq!(dc.total_degree, vec![2.0]);
    }

    #[test]
    fn max_normalization() {
        // Hub: A→B, A→C, A→D
        let hg = graph(&[("A", "B"), ("A", "C"), ("A", "D")]);
        let config = DegreeConfig {
            normalization: DegreeNormalization::Max,
        };
        let dc = degree_centrality(&hg, &config);
        assert_eq!(at(&hg, &dc.out_degree, "A"), 1.0);
        assert_eq!(at(&hg, &dc.in_degree, "B"), 1.0);
        assert!((at(&hg, &dc.total_degree, "B") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn max_normalization_without_edges_stays_zero() {
        let records = vec![FlowRecord::new("Z", "Z")];
        let options = GraphBuildOptions {
            self_loops: SelfLoopPolicy::Drop,
        };
        let hg = build_graph(&records, &options).expect("build");
        let config = DegreeConfig {
            normalization: DegreeNormalization::Max,
        };
        let dc = degree_centrality(&hg, &config);
        assert_eq!(dc.total_degree, vec![0.0]);
    }
}
