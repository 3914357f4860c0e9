//! # Node/edge incidence structures
//!
//! The incidence matrix `S` links the N nodes to the edge-weight vector:
//! `d = S·w` is the degree vector and `Sᵗ·x` scatters per-node quantities back
//! onto edges. The solvers only ever need those two products plus row and block
//! slices, so the representation is a strategy behind the [`Incidence`] trait:
//!
//! - [`SparseIncidence`]: CSR + CSC copies via `sprs`, `O(N²)` memory. Required
//!   beyond a few hundred nodes since `P` grows as `O(N²)`.
//! - [`DenseIncidence`]: a `smartcore` dense `N × P` matrix, `O(N³)` memory.
//!   Only reasonable for small graphs.
//!
//! ## Layout
//!
//! - Undirected: row `i` has a 1 in column `k` iff `i` is an endpoint of edge
//!   `k`; two 1s per column, `N-1` per row.
//! - Directed: `N × 2P`; row `i` has a 1 in column `c` iff `i` is the source of
//!   ordered edge `c`; one 1 per column, `N-1` per row.

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::{CsMat, TriMat};

use crate::pairs::{Orientation, PairIndex};

/// Largest graph for which [`IncidenceKind::Auto`] picks the dense layout.
pub const DENSE_INCIDENCE_MAX_NODES: usize = 200;

/// Representation used for the incidence structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidenceKind {
    Sparse,
    Dense,
    /// Dense up to [`DENSE_INCIDENCE_MAX_NODES`] nodes, sparse beyond.
    #[default]
    Auto,
}

impl IncidenceKind {
    /// Resolve `Auto` against a node count.
    pub fn resolve(self, nnodes: usize) -> IncidenceKind {
        match self {
            IncidenceKind::Auto if nnodes <= DENSE_INCIDENCE_MAX_NODES => IncidenceKind::Dense,
            IncidenceKind::Auto => IncidenceKind::Sparse,
            other => other,
        }
    }
}

/// Capabilities the solvers need from an incidence representation.
pub trait Incidence: Sized + Send + Sync {
    /// Build from the pair-index map.
    fn build(pairs: &PairIndex, orientation: Orientation) -> Self;

    /// `(nodes, edges)`
    fn shape(&self) -> (usize, usize);

    /// Stored non-zeros.
    fn nnz(&self) -> usize;

    /// Entry `S[row, col]`.
    fn get(&self, row: usize, col: usize) -> f64;

    /// `S·w`, the degree vector.
    fn mul_vec(&self, w: &[f64]) -> Vec<f64>;

    /// `Sᵗ·x`
    fn transpose_mul_vec(&self, x: &[f64]) -> Vec<f64>;

    /// `S[rows, :]·w`, degrees of a subset of nodes.
    fn slice_rows_mul_vec(&self, rows: &[usize], w: &[f64]) -> Vec<f64>;

    /// Dense `S[rows, cols]` slice.
    fn block(&self, rows: &[usize], cols: &[usize]) -> DenseMatrix<f64> {
        let mut out = DenseMatrix::zeros(rows.len(), cols.len());
        for (r, &row) in rows.iter().enumerate() {
            for (c, &col) in cols.iter().enumerate() {
                let v = self.get(row, col);
                if v != 0.0 {
                    out.set((r, c), v);
                }
            }
        }
        out
    }
}

/// `(row, col)` coordinates of every 1 in the incidence matrix.
fn incidence_entries(
    pairs: &PairIndex,
    orientation: Orientation,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    let p = pairs.npairs();
    pairs
        .coordinates()
        .iter()
        .enumerate()
        .flat_map(move |(k, &(i, j))| match orientation {
            Orientation::Undirected => [(i, k), (j, k)],
            Orientation::Directed => [(i, k), (j, k + p)],
        })
}

/// Sparse incidence, kept in both CSR (row products) and CSC (column products).
#[derive(Clone, Debug)]
pub struct SparseIncidence {
    csr: CsMat<f64>,
    csc: CsMat<f64>,
}

impl Incidence for SparseIncidence {
    fn build(pairs: &PairIndex, orientation: Orientation) -> Self {
        let shape = (pairs.nnodes(), pairs.nedges(orientation));
        let mut triplets = TriMat::new(shape);
        for (row, col) in incidence_entries(pairs, orientation) {
            triplets.add_triplet(row, col, 1.0);
        }

        let csr: CsMat<f64> = triplets.to_csr();
        let csc: CsMat<f64> = triplets.to_csc();
        debug!(
            "Sparse incidence built: {}x{} with {} non-zeros",
            shape.0,
            shape.1,
            csr.nnz()
        );
        Self { csr, csc }
    }

    fn shape(&self) -> (usize, usize) {
        (self.csr.rows(), self.csr.cols())
    }

    fn nnz(&self) -> usize {
        self.csr.nnz()
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.csr.get(row, col).copied().unwrap_or(0.0)
    }

    fn mul_vec(&self, w: &[f64]) -> Vec<f64> {
        assert_eq!(w.len(), self.csr.cols(), "weight vector must match incidence columns");
        (0..self.csr.rows())
            .into_par_iter()
            .map(|i| outer_dot(&self.csr, i, w))
            .collect()
    }

    fn transpose_mul_vec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.csc.rows(), "node vector must match incidence rows");
        (0..self.csc.cols())
            .into_par_iter()
            .map(|k| outer_dot(&self.csc, k, x))
            .collect()
    }

    fn slice_rows_mul_vec(&self, rows: &[usize], w: &[f64]) -> Vec<f64> {
        rows.iter().map(|&i| outer_dot(&self.csr, i, w)).collect()
    }
}

/// Dot product of outer slice `i` of a compressed matrix with a dense vector.
#[inline]
fn outer_dot(matrix: &CsMat<f64>, i: usize, v: &[f64]) -> f64 {
    matrix
        .outer_view(i)
        .map(|view| view.iter().map(|(j, &s)| s * v[j]).sum())
        .unwrap_or(0.0)
}

/// Dense incidence for small graphs.
#[derive(Clone, Debug)]
pub struct DenseIncidence {
    matrix: DenseMatrix<f64>,
    nnz: usize,
}

impl Incidence for DenseIncidence {
    fn build(pairs: &PairIndex, orientation: Orientation) -> Self {
        let (n, m) = (pairs.nnodes(), pairs.nedges(orientation));
        let mut matrix = DenseMatrix::zeros(n, m);
        let mut nnz = 0;
        for (row, col) in incidence_entries(pairs, orientation) {
            matrix.set((row, col), 1.0);
            nnz += 1;
        }
        debug!("Dense incidence built: {}x{} with {} non-zeros", n, m, nnz);
        Self { matrix, nnz }
    }

    fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    fn nnz(&self) -> usize {
        self.nnz
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        *self.matrix.get((row, col))
    }

    fn mul_vec(&self, w: &[f64]) -> Vec<f64> {
        let (n, m) = self.matrix.shape();
        assert_eq!(w.len(), m, "weight vector must match incidence columns");
        (0..n)
            .into_par_iter()
            .map(|i| (0..m).map(|k| self.matrix.get((i, k)) * w[k]).sum())
            .collect()
    }

    fn transpose_mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let (n, m) = self.matrix.shape();
        assert_eq!(x.len(), n, "node vector must match incidence rows");
        (0..m)
            .into_par_iter()
            .map(|k| (0..n).map(|i| self.matrix.get((i, k)) * x[i]).sum())
            .collect()
    }

    fn slice_rows_mul_vec(&self, rows: &[usize], w: &[f64]) -> Vec<f64> {
        let m = self.matrix.shape().1;
        trace!("Dense row slice over {} rows", rows.len());
        rows.iter()
            .map(|&i| (0..m).map(|k| self.matrix.get((i, k)) * w[k]).sum())
            .collect()
    }
}
