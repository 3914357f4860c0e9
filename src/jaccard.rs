//! # Set-similarity estimator
//!
//! Pairwise Jaccard distance between the item sets of N entities:
//!
//! ```text
//! distance(i, j) = 1 − |Aᵢ ∩ Aⱼ| / |Aᵢ ∪ Aⱼ|
//! ```
//!
//! Two empty sets have an empty union; that pair is given distance 1
//! (similarity 0). The diagonal is always 0, including for an entity with no
//! items.
//!
//! Sets are hashed once per entity; intersections probe the larger set with
//! the smaller one. Rows of the upper triangle are computed in parallel.
//!
//! Also provides the exact top-k Jaccard neighbourhood used as the baseline the
//! learned graph is compared against.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use log::{debug, info, trace};
use rayon::prelude::*;
use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{Error, Result};

/// Jaccard similarity of two hashed sets; 0 when both are empty.
pub fn jaccard_similarity<I: Eq + Hash>(a: &HashSet<I>, b: &HashSet<I>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|x| large.contains(*x)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Full symmetric `N × N` Jaccard distance matrix.
///
/// # Errors
///
/// `Error::EmptyInput` when `item_sets` is empty.
pub fn jaccard_distance_matrix<I>(item_sets: &[Vec<I>]) -> Result<DenseMatrix<f64>>
where
    I: Eq + Hash + Sync,
{
    let n = item_sets.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    info!("Computing Jaccard distances for {} entities", n);

    let sets: Vec<HashSet<&I>> = item_sets
        .par_iter()
        .map(|items| items.iter().collect())
        .collect();
    let empty = sets.iter().filter(|s| s.is_empty()).count();
    debug!(
        "Hashed {} item sets ({} empty, {} items in total)",
        n,
        empty,
        sets.iter().map(|s| s.len()).sum::<usize>()
    );

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .map(|j| 1.0 - jaccard_similarity(&sets[i], &sets[j]))
                .collect()
        })
        .collect();

    let mut distances = DenseMatrix::zeros(n, n);
    for (i, row) in upper.iter().enumerate() {
        for (offset, &dist) in row.iter().enumerate() {
            let j = i + 1 + offset;
            distances.set((i, j), dist);
            distances.set((j, i), dist);
        }
    }

    trace!("Jaccard distance matrix filled");
    Ok(distances)
}

/// `1 − distance` off the diagonal, 1 on it.
pub fn similarity_from_distance(distances: &DenseMatrix<f64>) -> DenseMatrix<f64> {
    let (n, m) = distances.shape();
    let mut sim = DenseMatrix::zeros(n, m);
    for i in 0..n {
        for j in 0..m {
            let v = if i == j { 1.0 } else { 1.0 - distances.get((i, j)) };
            sim.set((i, j), v);
        }
    }
    sim
}

/// Exact k-nearest-neighbour matrix from a Jaccard similarity matrix.
///
/// Row `i` keeps the similarities of its `k` most similar other entities (ties
/// broken by lower index), zero elsewhere, and 1 on the diagonal.
///
/// # Errors
///
/// `Error::InvalidParameter` when `k` is 0 or exceeds `N - 1`.
pub fn brute_force_knn(similarity: &DenseMatrix<f64>, k: usize) -> Result<DenseMatrix<f64>> {
    let (n, m) = similarity.shape();
    if n != m {
        return Err(Error::DimensionMismatch { what: "similarity columns", expected: n, found: m });
    }
    if k == 0 || k >= n {
        return Err(Error::invalid(
            "k",
            format!("must be in 1..={} for {} entities, got {}", n.saturating_sub(1), n, k),
        ));
    }
    debug!("Brute-force {}-NN over {} entities", k, n);

    let neighbours: Vec<Vec<(usize, f64)>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut row: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, *similarity.get((i, j))))
                .collect();
            row.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            row.truncate(k);
            row
        })
        .collect();

    let mut knn = DenseMatrix::zeros(n, n);
    for (i, row) in neighbours.into_iter().enumerate() {
        knn.set((i, i), 1.0);
        for (j, s) in row {
            knn.set((i, j), s);
        }
    }
    Ok(knn)
}
