//! Linear solvers for `M x = b`.
//!
//! - [`lu_solve`]: dense LU with partial pivoting (nalgebra). Rejects
//!   systems whose pivot ratio `min|Uᵢᵢ| / max|Uᵢᵢ|` falls below the caller's
//!   threshold, a cheap reciprocal-condition estimate.
//! - [`bicgstab`]: Jacobi-preconditioned BiCGSTAB on a [`SparseMatrix`].
//!   Works for general non-symmetric systems with `O(n + nnz)` memory.

#![allow(clippy::float_cmp, clippy::needless_range_loop)]

use nalgebra::DVector;

use crate::linalg::sparse::SparseMatrix;

/// Why a solve failed. Callers wrap this into their own error type.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveFailure {
    /// LU hit an exactly zero pivot.
    ZeroPivot,
    /// Pivot ratio below threshold.
    IllConditioned { pivot_ratio: f64 },
    /// BiCGSTAB scalar recurrence broke down.
    Breakdown { iteration: usize },
    /// BiCGSTAB ran out of iterations.
    NotConverged { iterations: usize, residual: f64 },
    /// The solution contains NaN or infinity.
    NonFinite,
}

impl std::fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroPivot => write!(f, "LU factorization hit a zero pivot"),
            Self::IllConditioned { pivot_ratio } => {
                write!(f, "pivot ratio {pivot_ratio:.3e} below threshold")
            }
            Self::Breakdown { iteration } => {
                write!(f, "BiCGSTAB breakdown at iteration {iteration}")
            }
            Self::NotConverged {
                iterations,
                residual,
            } => write!(
                f,
                "BiCGSTAB relative residual {residual:.3e} after {iterations} iterations"
            ),
            Self::NonFinite => write!(f, "solution is not finite"),
        }
    }
}

/// Solve `m x = b` by dense LU.
///
/// # Errors
///
/// Returns [`SolveFailure`] when the system is singular or ill-conditioned
/// beyond `min_pivot_ratio`.
pub fn lu_solve(m: &SparseMatrix, b: &[f64], min_pivot_ratio: f64) -> Result<Vec<f64>, SolveFailure> {
    if m.dim() == 0 {
        return Ok(Vec::new());
    }

    let lu = m.to_dense().lu();

    let (min_pivot, max_pivot) = lu
        .u()
        .diagonal()
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &p| {
            (lo.min(p.abs()), hi.max(p.abs()))
        });
    if max_pivot == 0.0 || min_pivot == 0.0 {
        return Err(SolveFailure::ZeroPivot);
    }
    let pivot_ratio = min_pivot / max_pivot;
    if pivot_ratio < min_pivot_ratio {
        return Err(SolveFailure::IllConditioned { pivot_ratio });
    }

    let rhs = DVector::from_column_slice(b);
    let x = lu.solve(&rhs).ok_or(SolveFailure::ZeroPivot)?;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(SolveFailure::NonFinite);
    }
    Ok(x.iter().copied().collect())
}

/// Solve `m x = b` with Jacobi-preconditioned BiCGSTAB.
///
/// Stops when `‖b - m x‖ / ‖b‖ < tolerance`.
///
/// # Errors
///
/// Returns [`SolveFailure::Breakdown`] when a recurrence denominator
/// vanishes and [`SolveFailure::NotConverged`] when `max_iter` is exhausted.
pub fn bicgstab(
    m: &SparseMatrix,
    b: &[f64],
    tolerance: f64,
    max_iter: usize,
) -> Result<Vec<f64>, SolveFailure> {
    let n = m.dim();
    let b_norm = norm(b);
    if n == 0 || b_norm == 0.0 {
        return Ok(vec![0.0; n]);
    }

    // Jacobi preconditioner; a zero diagonal entry falls back to identity.
    let inv_diag: Vec<f64> = m
        .diagonal()
        .into_iter()
        .map(|d| if d == 0.0 { 1.0 } else { 1.0 / d })
        .collect();
    let precondition = |src: &[f64], dst: &mut [f64]| {
        for ((d, s), k) in dst.iter_mut().zip(src).zip(&inv_diag) {
            *d = s * k;
        }
    };

    let mut x = vec![0.0; n];
    let mut r = b.to_vec();
    let r_hat = r.clone();
    let mut p = vec![0.0; n];
    let mut v = vec![0.0; n];
    let mut y = vec![0.0; n];
    let mut s = vec![0.0; n];
    let mut z = vec![0.0; n];
    let mut t = vec![0.0; n];

    let (mut rho_prev, mut alpha, mut omega) = (1.0_f64, 1.0_f64, 1.0_f64);
    let mut residual = 1.0;

    for iter in 0..max_iter {
        let rho = dot(&r_hat, &r);
        if rho == 0.0 || !rho.is_finite() {
            return Err(SolveFailure::Breakdown { iteration: iter });
        }

        if iter == 0 {
            p.copy_from_slice(&r);
        } else {
            let beta = (rho / rho_prev) * (alpha / omega);
            for i in 0..n {
                p[i] = r[i] + beta * (p[i] - omega * v[i]);
            }
        }

        precondition(&p, &mut y);
        m.mul_vec(&y, &mut v);
        let r_hat_v = dot(&r_hat, &v);
        if r_hat_v == 0.0 || !r_hat_v.is_finite() {
            return Err(SolveFailure::Breakdown { iteration: iter });
        }
        alpha = rho / r_hat_v;

        for i in 0..n {
            s[i] = r[i] - alpha * v[i];
        }
        if norm(&s) / b_norm < tolerance {
            for i in 0..n {
                x[i] += alpha * y[i];
            }
            return finite_or_err(x);
        }

        precondition(&s, &mut z);
        m.mul_vec(&z, &mut t);
        let tt = dot(&t, &t);
        if tt == 0.0 {
            return Err(SolveFailure::Breakdown { iteration: iter });
        }
        omega = dot(&t, &s) / tt;

        for i in 0..n {
            x[i] += alpha * y[i] + omega * z[i];
            r[i] = s[i] - omega * t[i];
        }

        residual = norm(&r) / b_norm;
        if residual < tolerance {
            return finite_or_err(x);
        }
        if omega == 0.0 || !omega.is_finite() {
            return Err(SolveFailure::Breakdown { iteration: iter });
        }
        rho_prev = rho;
    }

    Err(SolveFailure::NotConverged {
        iterations: max_iter,
        residual,
    })
}

fn finite_or_err(x: Vec<f64>) -> Result<Vec<f64>, SolveFailure> {
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(SolveFailure::NonFinite)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> (SparseMatrix, Vec<f64>) {
        // [[4, 1, 0], [1, 3, -1], [0, -1, 2]] x = [1, 2, 3]
        let m = SparseMatrix::from_triplets(
            3,
            vec![
                (0, 0, 4.0),
                (0, 1, 1.0),
                (1, 0, 1.0),
                (1, 1, 3.0),
                (1, 2, -1.0),
                (2, 1, -1.0),
                (2, 2, 2.0),
            ],
        );
        (m, vec![1.0, 2.0, 3.0])
    }

    fn residual(m: &SparseMatrix, x: &[f64], b: &[f64]) -> f64 {
        let mut mx = vec![0.0; b.len()];
        m.mul_vec(x, &mut mx);
        mx.iter().zip(b).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max)
    }

    #[test]
    fn lu_and_bicgstab_agree() {
        let (m, b) = system();
        let direct = lu_solve(&m, &b, 1e-12).expect("lu");
        let iterative = bicgstab(&m, &b, 1e-12, 100).expect("bicgstab");
        assert!(residual(&m, &direct, &b) < 1e-10);
        for (d, i) in direct.iter().zip(&iterative) {
            assert!((d - i).abs() < 1e-8, "direct={d} iterative={i}");
        }
    }

    #[test]
    fn lu_rejects_singular() {
        let m = SparseMatrix::from_triplets(
            2,
            vec![(0, 0, 1.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 1.0)],
        );
        let err = lu_solve(&m, &[1.0, 1.0], 1e-12).expect_err("singular");
        assert_eq!(err, SolveFailure::ZeroPivot);
    }

    #[test]
    fn lu_rejects_ill_conditioned() {
        let m = SparseMatrix::from_triplets(2, vec![(0, 0, 1.0), (1, 1, 1e-14)]);
        let err = lu_solve(&m, &[1.0, 1.0], 1e-12).expect_err("ill conditioned");
        assert!(matches!(err, SolveFailure::IllConditioned { .. }));
    }

    #[test]
    fn bicgstab_zero_rhs_is_zero() {
        let (m, _) = system();
        assert_eq!(bicgstab(&m, &[0.0; 3], 1e-10, 10).expect("solve"), vec![0.0; 3]);
    }

    #[test]
    fn bicgstab_reports_exhaustion() {
        let (m, b) = system();
        let err = bicgstab(&m, &b, 1e-300, 1).expect_err("one iteration is not enough");
        assert!(matches!(err, SolveFailure::NotConverged { iterations: 1, .. }));
    }
}
