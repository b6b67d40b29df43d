//! Eigenvector centrality via shifted power iteration.
//!
//! # Overview
//!
//! A host is central when it receives flows from hosts that are themselves
//! central: the score vector is the dominant eigenvector of `Aᵀ`, where
//! `A[u][v]` is the number of flows `u → v`.
//!
//! # Algorithm
//!
//! 1. Split the graph into strongly connected components. For each cyclic
//!    one, find its spectral radius and Perron vector by power iteration on
//!    the component alone, stopping once the Collatz–Wielandt bounds
//!    `min (Aᵀx)ᵢ/xᵢ ≤ ρ ≤ max (Aᵀx)ᵢ/xᵢ` meet within `tolerance`.
//! 2. Components whose radius matches the largest one are *basic*. Seed the
//!    scores with the Perron vectors of the basic components that reach no
//!    other basic component; everything else starts at 0.
//! 3. `x ← x + Aᵀx` (same eigenvectors as `Aᵀ`, but the shift removes the
//!    oscillation plain power iteration shows on periodic graphs such as
//!    bipartite client/server traffic), scaled so the largest score is 1.
//! 4. Stop when no score moved more than `tolerance`; fail with
//!    [`AnalysisError::Convergence`] after `max_iter` steps.
//!
//! When one basic component feeds another (`A ⇄ B → C ⇄ D`) the dominant
//! eigenvalue is defective and iterating from all ones creeps toward the
//! answer like `1/k`. Seeding from the downstream basic components only
//! leaves a semisimple dominant eigenvalue, so step 3 converges
//! geometrically.
//!
//! # Acyclic Graphs
//!
//! Without a directed cycle every eigenvalue of `Aᵀ` is 0 and the dominant
//! eigenvector is the zero vector. Such graphs get all-zero scores without
//! iterating. A self-loop counts as a cycle.

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::error::AnalysisError;
use crate::graph::build::HostGraph;
use crate::linalg::SparseMatrix;
use crate::metrics::Measure;

/// Radii within this many tolerances of the largest count as equal.
const RADIUS_SLACK: f64 = 10.0;

/// Configuration for eigenvector centrality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigenvectorConfig {
    /// Iteration cap. Default: 1000.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Max absolute change per score that counts as converged. Default: 1e-9.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for EigenvectorConfig {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
        }
    }
}

const fn default_max_iter() -> usize {
    1000
}

const fn default_tolerance() -> f64 {
    1e-9
}

/// Compute eigenvector centrality, max-normalized to 1.
///
/// # Errors
///
/// Returns [`AnalysisError::Convergence`] when the iteration cap is reached
/// before the tolerance.
#[instrument(skip(hg, config), fields(nodes = hg.node_count()))]
pub fn eigenvector_centrality(
    hg: &HostGraph,
    config: &EigenvectorConfig,
) -> Result<Vec<f64>, AnalysisError> {
    let n = hg.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let Some(mut scores) = seed_scores(hg, config)? else {
        return Ok(vec![0.0; n]);
    };

    let adjacency = SparseMatrix::adjacency(hg);
    let mut propagated = vec![0.0; n];

    for iter in 0..config.max_iter {
        adjacency.transpose_mul_vec(&scores, &mut propagated);
        for (p, s) in propagated.iter_mut().zip(&scores) {
            *p += s;
        }

        let max = propagated.iter().copied().fold(0.0_f64, f64::max);
        if max > 0.0 {
            for p in &mut propagated {
                *p /= max;
            }
        }

        let diff = scores
            .iter()
            .zip(&propagated)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0_f64, f64::max);

        std::mem::swap(&mut scores, &mut propagated);

        if diff < config.tolerance {
            trace!(iterations = iter + 1, "eigenvector converged");
            return Ok(scores);
        }
    }

    Err(convergence_error(config))
}

// ---------------------------------------------------------------------------
// Component seeding
// ---------------------------------------------------------------------------

/// Dominant eigenpair of one strongly connected component.
struct Eigenpair {
    radius: f64,
    /// Perron vector over the component's nodes, max-normalized.
    vector: Vec<f64>,
}

/// Starting scores: Perron vectors of the basic components that reach no
/// other basic component, 0 elsewhere. `None` when the graph is acyclic.
fn seed_scores(
    hg: &HostGraph,
    config: &EigenvectorConfig,
) -> Result<Option<Vec<f64>>, AnalysisError> {
    let n = hg.node_count();
    // Reverse topological order: a component's successors come before it.
    let components = tarjan_scc(&hg.graph);

    let mut component_of = vec![0usize; n];
    let mut local = vec![0usize; n];
    for (c, nodes) in components.iter().enumerate() {
        for (i, v) in nodes.iter().enumerate() {
            component_of[v.index()] = c;
            local[v.index()] = i;
        }
    }

    let mut eigenpairs: Vec<Option<Eigenpair>> = Vec::with_capacity(components.len());
    for (c, nodes) in components.iter().enumerate() {
        let cyclic = nodes.len() > 1 || nodes.iter().any(|&v| hg.graph.contains_edge(v, v));
        eigenpairs.push(if cyclic {
            Some(component_eigenpair(hg, nodes, c, &component_of, &local, config)?)
        } else {
            None
        });
    }

    let Some(radius) = eigenpairs
        .iter()
        .flatten()
        .map(|p| p.radius)
        .reduce(f64::max)
    else {
        return Ok(None);
    };
    let slack = RADIUS_SLACK * config.tolerance * radius.max(1.0);
    let basic = |c: usize| {
        eigenpairs[c]
            .as_ref()
            .filter(|p| radius - p.radius <= slack)
    };

    let mut scores = vec![0.0; n];
    let mut reaches_basic = vec![false; components.len()];
    for (c, nodes) in components.iter().enumerate() {
        let downstream = nodes
            .iter()
            .flat_map(|&v| hg.graph.neighbors(v))
            .map(|w| component_of[w.index()])
            .filter(|&d| d != c)
            .any(|d| reaches_basic[d] || basic(d).is_some());
        reaches_basic[c] = downstream;
        if downstream {
            continue;
        }
        if let Some(pair) = basic(c) {
            for (v, &s) in nodes.iter().zip(&pair.vector) {
                scores[v.index()] = s;
            }
        }
    }

    trace!(components = components.len(), radius, "eigenvector seeded");
    Ok(Some(scores))
}

/// Shifted power iteration restricted to one cyclic component.
fn component_eigenpair(
    hg: &HostGraph,
    nodes: &[NodeIndex],
    component: usize,
    component_of: &[usize],
    local: &[usize],
    config: &EigenvectorConfig,
) -> Result<Eigenpair, AnalysisError> {
    let mut x = vec![1.0; nodes.len()];
    let mut y = vec![0.0; nodes.len()];

    for _ in 0..config.max_iter {
        for (slot, &v) in y.iter_mut().zip(nodes) {
            *slot = hg
                .graph
                .edges_directed(v, Direction::Incoming)
                .filter(|e| component_of[e.source().index()] == component)
                .map(|e| f64::from(*e.weight()) * x[local[e.source().index()]])
                .sum();
        }

        // x stays strictly positive on an irreducible block.
        let (lo, hi) = x
            .iter()
            .zip(&y)
            .map(|(a, b)| b / a)
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), r| (lo.min(r), hi.max(r)));
        if hi - lo <= config.tolerance * hi.max(1.0) {
            return Ok(Eigenpair {
                radius: f64::midpoint(lo, hi),
                vector: x,
            });
        }

        for (xi, yi) in x.iter_mut().zip(&y) {
            *xi += yi;
        }
        let max = x.iter().copied().fold(0.0_f64, f64::max);
        for xi in &mut x {
            *xi /= max;
        }
    }

    Err(convergence_error(config))
}

const fn convergence_error(config: &EigenvectorConfig) -> AnalysisError {
    AnalysisError::Convergence {
        measure: Measure::Eigenvector,
        iterations: config.max_iter,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
