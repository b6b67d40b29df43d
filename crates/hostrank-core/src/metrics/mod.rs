//! Centrality measures for the host graph.
//!
//! # Overview
//!
//! Each measure answers a different question about host importance:
//!
//! - **Degree** (`degree`): how many flows a host sends and receives.
//! - **Closeness** (`closeness`): how few hops a host needs to reach the
//!   hosts it can reach at all.
//! - **Eigenvector** (`eigenvector`): is the host contacted by hosts that
//!   are themselves heavily contacted?
//! - **PageRank** (`pagerank`): where does a random walk over flows spend
//!   its time?
//! - **Alpha centrality** (`alpha`): eigenvector-style importance plus an
//!   exogenous degree term, from the linear system `(I − αA)c = d`.
//!
//! # Usage
//!
//! All measures take a [`HostGraph`](crate::graph::HostGraph) reference and
//! return one score per vertex, positioned by vertex index (insertion order).
//! [`crate::engine::CentralityEngine`] runs them together and keys the
//! results by host.
//!
//! ```rust
//! use hostrank_core::flow::FlowRecord;
//! use hostrank_core::graph::{GraphBuildOptions, build_graph};
//! use hostrank_core::metrics::pagerank::{PageRankConfig, pagerank};
//!
//! let flows: Vec<FlowRecord> = [("A", "B"), ("B", "A")].into_iter().map(Into::into).collect();
//! let graph = build_graph(&flows, &GraphBuildOptions::default()).unwrap();
//! let ranks = pagerank(&graph, &PageRankConfig::default()).unwrap();
//! assert!((ranks[0] - 0.5).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

pub mod alpha;
pub mod closeness;
pub mod degree;
pub mod eigenvector;
pub mod pagerank;

/// Identifies one centrality measure (and its result column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Degree,
    Closeness,
    Eigenvector,
    #[serde(rename = "pagerank")]
    PageRank,
    AlphaCentrality,
}

impl Measure {
    /// Every measure, in export column order.
    pub const ALL: [Self; 5] = [
        Self::Degree,
        Self::Closeness,
        Self::Eigenvector,
        Self::PageRank,
        Self::AlphaCentrality,
    ];

    /// Column name used in result tables and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Closeness => "closeness",
            Self::Eigenvector => "eigenvector",
            Self::PageRank => "pagerank",
            Self::AlphaCentrality => "alpha_centrality",
        }
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject a score vector containing NaN or infinity.
pub(crate) fn ensure_finite(
    measure: Measure,
    scores: Vec<f64>,
) -> Result<Vec<f64>, crate::error::AnalysisError> {
    match scores.iter().position(|s| !s.is_finite()) {
        None => Ok(scores),
        Some(i) => Err(crate::error::AnalysisError::Computation {
            measure,
            reason: format!("non-finite score at vertex {i}"),
        }),
    }
}
