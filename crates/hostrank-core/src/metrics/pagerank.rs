//! PageRank over the flow graph.
//!
//! # Overview
//!
//! PageRank models a random walker that follows flows: from host `u` it
//! moves to `v` with probability proportional to the number of `u → v`
//! flows, and with probability `1 - d` it teleports to a uniformly random
//! host. Hosts where the walker spends the most time rank highest.
//!
//! # Algorithm
//!
//! Iterative power method:
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ PR(u) * w(u, v) / out_weight(u)   for each u → v
//!       + d * Σ PR(s) / N                                        for each sink s
//! ```
//!
//! where `d` is the damping factor (default 0.85).
//!
//! # Sinks
//!
//! Hosts that only receive flows (zero out-weight) would leak rank mass.
//! Their rank is redistributed uniformly over all hosts each iteration, so
//! the scores always sum to 1.

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::error::AnalysisError;
use crate::graph::build::HostGraph;
use crate::linalg::SparseMatrix;
use crate::metrics::Measure;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for PageRank computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a flow vs teleporting).
    /// Default: 0.85.
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Convergence threshold: stop when L1 norm of rank delta < tolerance.
    /// Default: 1e-10.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 1000.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
        }
    }
}

const fn default_damping() -> f64 {
    0.85
}

const fn default_tolerance() -> f64 {
    1e-10
}

const fn default_max_iter() -> usize {
    1000
}

// ---------------------------------------------------------------------------
// PageRank
// ---------------------------------------------------------------------------

/// Compute PageRank for every vertex.
///
/// # Errors
///
/// Returns [`AnalysisError::Convergence`] if the L1 delta is still above
/// `tolerance` after `max_iter` iterations.
#[instrument(skip(hg, config), fields(nodes = hg.node_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn pagerank(hg: &HostGraph, config: &PageRankConfig) -> Result<Vec<f64>, AnalysisError> {
    let n = hg.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let adjacency = SparseMatrix::adjacency(hg);
    let out_weight = adjacency.row_sums();

    let n_f64 = n as f64;
    let base = (1.0 - config.damping) / n_f64;

    // Initialize ranks uniformly.
    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    for iter in 0..config.max_iter {
        // Sink mass is shared by everyone.
        let dangling: f64 = ranks
            .iter()
            .zip(&out_weight)
            .filter(|&(_, &w)| w == 0.0)
            .map(|(r, _)| r)
            .sum();
        new_ranks.fill(base + config.damping * dangling / n_f64);

        // Distribute rank along outgoing flows, proportional to weight.
        for (u, &w_out) in out_weight.iter().enumerate() {
            if w_out == 0.0 {
                continue;
            }
            let share = config.damping * ranks[u] / w_out;
            for (v, w) in adjacency.row(u) {
                new_ranks[v] += share * w;
            }
        }

        // Check convergence: L1 norm of delta.
        let delta: f64 = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);

        if delta < config.tolerance {
            trace!(iterations = iter + 1, "pagerank converged");
            return Ok(ranks);
        }
    }

    Err(AnalysisError::Convergence {
        measure: Measure::PageRank,
        iterations: config.max_iter,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
