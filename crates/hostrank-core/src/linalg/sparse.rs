//! Compressed sparse row (CSR) matrices over `f64`.
//!
//! Host graphs from flow captures are extremely sparse (a few edges per
//! host on average), so every matrix-shaped computation in the engine runs
//! on this representation: memory is `O(n + nnz)` instead of `O(n²)`.

use nalgebra::DMatrix;
use petgraph::visit::EdgeRef;

use crate::graph::build::HostGraph;

/// Square sparse matrix in CSR layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    dim: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Build from `(row, col, value)` entries. Duplicate coordinates are summed.
    ///
    /// # Panics
    ///
    /// Panics if an entry lies outside `dim × dim`.
    #[must_use]
    pub fn from_triplets(dim: usize, mut entries: Vec<(usize, usize, f64)>) -> Self {
        entries.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_ptr = vec![0usize; dim + 1];
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, value) in entries {
            assert!(row < dim && col < dim, "entry ({row}, {col}) outside {dim}x{dim}");
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += value;
                }
                continue;
            }
            row_ptr[row + 1] += 1;
            col_idx.push(col);
            values.push(value);
            last = Some((row, col));
        }

        for i in 0..dim {
            row_ptr[i + 1] += row_ptr[i];
        }

        Self {
            dim,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Weighted adjacency matrix: `A[i][j]` = flows from vertex `i` to `j`.
    #[must_use]
    pub fn adjacency(hg: &HostGraph) -> Self {
        let g = &hg.graph;
        let entries = g
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), f64::from(*e.weight())))
            .collect();
        Self::from_triplets(g.node_count(), entries)
    }

    /// `I - scale * self`, keeping the result sparse.
    #[must_use]
    pub fn identity_minus_scaled(&self, scale: f64) -> Self {
        let mut entries: Vec<(usize, usize, f64)> = Vec::with_capacity(self.nnz() + self.dim);
        for i in 0..self.dim {
            entries.push((i, i, 1.0));
            for (j, v) in self.row(i) {
                entries.push((i, j, -scale * v));
            }
        }
        Self::from_triplets(self.dim, entries)
    }

    /// Matrix dimension (rows == columns).
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate the stored `(column, value)` pairs of row `i`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter().copied())
    }

    /// Diagonal entries (zero where nothing is stored).
    #[must_use]
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.dim)
            .map(|i| self.row(i).find(|&(j, _)| j == i).map_or(0.0, |(_, v)| v))
            .collect()
    }

    /// Row sums (out-weight per vertex for an adjacency matrix).
    #[must_use]
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.dim).map(|i| self.row(i).map(|(_, v)| v).sum()).collect()
    }

    /// `y = A x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` does not match the matrix dimension.
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.dim);
        assert_eq!(y.len(), self.dim);
        for (i, out) in y.iter_mut().enumerate() {
            *out = self.row(i).map(|(j, v)| v * x[j]).sum();
        }
    }

    /// `y = Aᵀ x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` does not match the matrix dimension.
    pub fn transpose_mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.dim);
        assert_eq!(y.len(), self.dim);
        y.fill(0.0);
        for (i, &xi) in x.iter().enumerate() {
            if xi == 0.0 {
                continue;
            }
            for (j, v) in self.row(i) {
                y[j] += v * xi;
            }
        }
    }

    /// Dense copy for the direct solver. Only used on bounded sizes.
    #[must_use]
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.dim, self.dim);
        for i in 0..self.dim {
            for (j, v) in self.row(i) {
                dense[(i, j)] = v;
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseMatrix {
        // [[0, 2, 0],
        //  [0, 0, 1],
        //  [1, 0, 0]]
        SparseMatrix::from_triplets(3, vec![(2, 0, 1.0), (0, 1, 1.0), (1, 2, 1.0), (0, 1, 1.0)])
    }

    #[test]
    fn duplicates_are_summed() {
        let m = sample();
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(1, 2.0)]);
    }

    #[test]
    fn mul_and_transpose_mul() {
        let m = sample();
        let x = [1.0, 10.0, 100.0];
        let mut y = [0.0; 3];
        m.mul_vec(&x, &mut y);
        assert_eq!(y, [20.0, 100.0, 1.0]);
        m.transpose_mul_vec(&x, &mut y);
        assert_eq!(y, [100.0, 2.0, 10.0]);
    }

    #[test]
    fn identity_minus_scaled_merges_diagonal() {
        let m = SparseMatrix::from_triplets(2, vec![(0, 0, 1.0), (0, 1, 1.0)]);
        let shifted = m.identity_minus_scaled(0.5);
        assert_eq!(shifted.diagonal(), vec![0.5, 1.0]);
        let dense = shifted.to_dense();
        assert!((dense[(0, 1)] + 0.5).abs() < 1e-15);
        assert!((dense[(1, 0)]).abs() < 1e-15);
    }

    #[test]
    fn row_sums_match_out_weight() {
        assert_eq!(sample().row_sums(), vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_matrix() {
        let m = SparseMatrix::from_triplets(0, Vec::new());
        assert_eq!(m.dim(), 0);
        assert_eq!(m.nnz(), 0);
        assert_eq!(m.to_dense().nrows(), 0);
    }
}
