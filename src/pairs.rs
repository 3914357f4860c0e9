//! # Pair-index map between node space and edge-weight space
//!
//! Every unordered pair `{i, j}` with `i < j` gets a linear edge index `k` in
//! `[0, P)`, `P = N·(N-1)/2`, enumerated row-major: outer `i` ascending, inner
//! `j > i` ascending. Any vector built in this order (targets, weights) lines up
//! with the incidence columns.
//!
//! Directed graphs double the edge space: edge `k = (i, j)` owns `w[k]` for
//! `i → j` and `w[k + P]` for `j → i`.
//!
//! ```
//! use graph_discovery::pairs::PairIndex;
//!
//! let pairs = PairIndex::new(4);
//! assert_eq!(pairs.npairs(), 6);
//! assert_eq!(pairs.edge(0, 1), Some(0));
//! assert_eq!(pairs.edge(3, 2), Some(5));
//! assert_eq!(pairs.pair(4), (1, 3));
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::incidence::Incidence;

/// Whether edges carry one weight per unordered pair or one per ordered pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Undirected,
    Directed,
}

const UNSET: usize = usize::MAX;

#[derive(Clone, Debug)]
pub struct PairIndex {
    nnodes: usize,
    // (i, j) for every edge index, i < j
    coords: Vec<(usize, usize)>,
    // N×N row-major, upper triangle populated
    lookup: Vec<usize>,
}

impl PairIndex {
    /// Enumerate all pairs of `nnodes` nodes once, in row-major order.
    ///
    /// Fewer than two nodes yields a degenerate map with no edges.
    pub fn new(nnodes: usize) -> Self {
        let npairs = nnodes * nnodes.saturating_sub(1) / 2;
        let mut coords = Vec::with_capacity(npairs);
        let mut lookup = vec![UNSET; nnodes * nnodes];

        let mut k = 0;
        for i in 0..nnodes {
            for j in (i + 1)..nnodes {
                coords.push((i, j));
                lookup[i * nnodes + j] = k;
                k += 1;
            }
        }
        debug_assert_eq!(k, npairs);

        debug!("Pair index built: {} nodes, {} pairs", nnodes, npairs);
        Self { nnodes, coords, lookup }
    }

    pub fn nnodes(&self) -> usize {
        self.nnodes
    }

    /// Number of unordered pairs `P`.
    pub fn npairs(&self) -> usize {
        self.coords.len()
    }

    /// Width of the edge-weight vector for the given orientation.
    pub fn nedges(&self, orientation: Orientation) -> usize {
        match orientation {
            Orientation::Undirected => self.npairs(),
            Orientation::Directed => 2 * self.npairs(),
        }
    }

    /// True when there is nothing to optimise (N < 2).
    pub fn is_degenerate(&self) -> bool {
        self.coords.is_empty()
    }

    /// Node pair `(i, j)`, `i < j`, of edge `k`.
    pub fn pair(&self, k: usize) -> (usize, usize) {
        self.coords[k]
    }

    /// All pair coordinates in edge-index order.
    pub fn coordinates(&self) -> &[(usize, usize)] {
        &self.coords
    }

    /// Edge index of the unordered pair `{i, j}`, regardless of argument order.
    pub fn edge(&self, i: usize, j: usize) -> Option<usize> {
        if i == j || i >= self.nnodes || j >= self.nnodes {
            return None;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        Some(self.lookup[lo * self.nnodes + hi])
    }

    /// Index in the doubled edge space of the ordered edge `src → dst`.
    pub fn directed_edge(&self, src: usize, dst: usize) -> Option<usize> {
        let k = self.edge(src, dst)?;
        if src < dst {
            Some(k)
        } else {
            Some(k + self.npairs())
        }
    }

    /// Ordered `(src, dst)` of index `c` in the doubled edge space.
    pub fn directed_pair(&self, c: usize) -> (usize, usize) {
        let p = self.npairs();
        if c < p {
            self.coords[c]
        } else {
            let (i, j) = self.coords[c - p];
            (j, i)
        }
    }

    /// Build the node/edge incidence structure with the chosen representation.
    pub fn incidence<S: Incidence>(&self, orientation: Orientation) -> S {
        trace!("Building {:?} incidence for {} nodes", orientation, self.nnodes);
        S::build(self, orientation)
    }

    /// Target vector for an undirected solve: the upper triangle of `distances`
    /// in edge order.
    pub fn upper_triangle(&self, distances: &DenseMatrix<f64>) -> Vec<f64> {
        self.coords.iter().map(|&(i, j)| *distances.get((i, j))).collect()
    }

    /// Target vector for a directed solve: `Z[i,j]` for `i → j` followed by
    /// `Z[j,i]` for `j → i`.
    pub fn directed_targets(&self, distances: &DenseMatrix<f64>) -> Vec<f64> {
        let forward = self.coords.iter().map(|&(i, j)| *distances.get((i, j)));
        let backward = self.coords.iter().map(|&(i, j)| *distances.get((j, i)));
        forward.chain(backward).collect()
    }

    /// Targets for the given orientation.
    pub fn targets(&self, distances: &DenseMatrix<f64>, orientation: Orientation) -> Vec<f64> {
        match orientation {
            Orientation::Undirected => self.upper_triangle(distances),
            Orientation::Directed => self.directed_targets(distances),
        }
    }
}
