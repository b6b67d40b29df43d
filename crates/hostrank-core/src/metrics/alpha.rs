//! Alpha centrality: `(I − αA) c = d`.
//!
//! # Definition
//!
//! ```text
//! c = α A c + d        ⇔        (I − αA) c = d
//! ```
//!
//! `A[i][j]` is the number of flows `i → j` and `d` is an exogenous
//! per-host term, here one of the degree vectors the result table also
//! reports (see [`ExogenousDegree`]). With `α → 0` the scores collapse to
//! `d`; growing `α` mixes in more of the network structure.
//!
//! # Choosing α
//!
//! `I − αA` is non-singular whenever `α < 1 / ρ(A)` (ρ = spectral radius),
//! which is why the default is a small 0.1. The solver never retries with a
//! different `α`; a singular system is reported to the caller.
//!
//! # Solvers
//!
//! - [`AlphaMethod::Direct`]: dense LU on a copy of `I − αA`. Exact and
//!   robust, but `O(n²)` memory, so it is limited to `dense_limit` hosts.
//! - [`AlphaMethod::Iterative`]: BiCGSTAB on the sparse `I − αA`.
//! - [`AlphaMethod::Auto`]: Direct up to `dense_limit`, Iterative above.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::AnalysisError;
use crate::graph::build::HostGraph;
use crate::linalg::{SolveFailure, SparseMatrix, bicgstab, lu_solve};
use crate::metrics::degree::weighted_degrees;

/// Which degree vector forms the right-hand side `d`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExogenousDegree {
    /// Flows sent.
    #[default]
    OutDegree,
    /// Flows received.
    InDegree,
    /// Flows sent plus received.
    TotalDegree,
}

/// How the linear system is solved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaMethod {
    #[default]
    Auto,
    Direct,
    Iterative,
}

/// Configuration for alpha centrality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaConfig {
    /// Attenuation factor, strictly between 0 and 1. Default: 0.1.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub exogenous: ExogenousDegree,
    #[serde(default)]
    pub method: AlphaMethod,
    /// Largest vertex count solved densely. Default: 2048.
    #[serde(default = "default_dense_limit")]
    pub dense_limit: usize,
    /// Relative residual target for the iterative solver. Default: 1e-10.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Iteration cap for the iterative solver. Default: 1000.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Minimum LU pivot ratio before the system counts as singular.
    /// Default: 1e-12.
    #[serde(default = "default_singular_threshold")]
    pub singular_threshold: f64,
}

impl Default for AlphaConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            exogenous: ExogenousDegree::default(),
            method: AlphaMethod::default(),
            dense_limit: default_dense_limit(),
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
            singular_threshold: default_singular_threshold(),
        }
    }
}

const fn default_alpha() -> f64 {
    0.1
}

const fn default_dense_limit() -> usize {
    2048
}

const fn default_tolerance() -> f64 {
    1e-10
}

const fn default_max_iter() -> usize {
    1000
}

const fn default_singular_threshold() -> f64 {
    1e-12
}

impl AlphaConfig {
    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] when `alpha` is outside
    /// `(0, 1)` or a tolerance/cap is not positive.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }
        if !(self.tolerance > 0.0) || self.max_iter == 0 {
            return Err(AnalysisError::InvalidConfig(
                "alpha solver needs a positive tolerance and max_iter".to_string(),
            ));
        }
        if !(self.singular_threshold >= 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "alpha singular_threshold must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// The exogenous vector `d` for `hg`, as raw weighted degrees.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn exogenous_vector(hg: &HostGraph, exogenous: ExogenousDegree) -> Vec<f64> {
    let (in_deg, out_deg) = weighted_degrees(hg);
    in_deg
        .into_iter()
        .zip(out_deg)
        .map(|(i, o)| match exogenous {
            ExogenousDegree::OutDegree => o as f64,
            ExogenousDegree::InDegree => i as f64,
            ExogenousDegree::TotalDegree => (i + o) as f64,
        })
        .collect()
}

/// Solve `(I − αA) c = d` for every vertex.
///
/// # Errors
///
/// - [`AnalysisError::InvalidConfig`] for out-of-range parameters, or
///   [`AlphaMethod::Direct`] on a graph larger than `dense_limit`.
/// - [`AnalysisError::SingularSystem`] when the system cannot be solved at
///   this `alpha`.
#[instrument(skip(hg, config), fields(nodes = hg.node_count(), alpha = config.alpha))]
pub fn solve_alpha_centrality(
    hg: &HostGraph,
    config: &AlphaConfig,
) -> Result<Vec<f64>, AnalysisError> {
    config.validate()?;

    let n = hg.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let direct = match config.method {
        AlphaMethod::Auto => n <= config.dense_limit,
        AlphaMethod::Direct if n > config.dense_limit => {
            return Err(AnalysisError::InvalidConfig(format!(
                "direct alpha solve refused for {n} vertices (dense_limit = {})",
                config.dense_limit
            )));
        }
        AlphaMethod::Direct => true,
        AlphaMethod::Iterative => false,
    };

    let system = SparseMatrix::adjacency(hg).identity_minus_scaled(config.alpha);
    let rhs = exogenous_vector(hg, config.exogenous);

    debug!(direct, nnz = system.nnz(), "solving alpha-centrality system");

    let solved = if direct {
        lu_solve(&system, &rhs, config.singular_threshold)
    } else {
        bicgstab(&system, &rhs, config.tolerance, config.max_iter)
    };

    solved.map_err(|failure: SolveFailure| AnalysisError::SingularSystem {
        alpha: config.alpha,
        vertices: n,
        reason: failure.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
