//! Ranked adjacency export of a learned similarity matrix.
//!
//! Each node (labelled 1-based, as a string) maps to its neighbours sorted by
//! descending weight, each neighbour as a single-entry `{label: weight}` map.
//! Zero weights and self-loops are left out.
//!
//! ```json
//! { "1": [ { "3": 0.81 }, { "2": 0.12 } ], "2": [ ... ] }
//! ```

use std::cmp::Ordering;

use log::{debug, info};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Neighbour lists of a single node.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedNeighbours {
    pub label: String,
    /// `(neighbour label, weight)`, descending weight.
    pub neighbours: Vec<(String, f64)>,
}

/// Ranked adjacency of every node, in node order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnnGraph {
    pub nodes: Vec<RankedNeighbours>,
}

impl KnnGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Neighbour list of the node with the given 1-based label.
    pub fn neighbours(&self, label: &str) -> Option<&[(String, f64)]> {
        self.nodes
            .iter()
            .find(|n| n.label == label)
            .map(|n| n.neighbours.as_slice())
    }

    /// Total number of exported edges.
    pub fn nedges(&self) -> usize {
        self.nodes.iter().map(|n| n.neighbours.len()).sum()
    }
}

struct SingleEntry<'a>(&'a str, f64);

impl Serialize for SingleEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, &self.1)?;
        map.end()
    }
}

struct EntryList<'a>(&'a [(String, f64)]);

impl Serialize for EntryList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|(label, w)| SingleEntry(label, *w)))
    }
}

impl Serialize for KnnGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.nodes
                .iter()
                .map(|n| (n.label.as_str(), EntryList(&n.neighbours))),
        )
    }
}

/// Rank the non-zero neighbours of every node by descending weight.
///
/// Ties are broken by neighbour index. `top_k` truncates each list.
pub fn ranked_adjacency(similarities: &DenseMatrix<f64>, top_k: Option<usize>) -> KnnGraph {
    let (n, m) = similarities.shape();
    assert_eq!(n, m, "similarity matrix must be square");

    let nodes: Vec<RankedNeighbours> = (0..n)
        .map(|i| {
            let mut row: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, *similarities.get((i, j))))
                .filter(|&(_, w)| w != 0.0)
                .collect();
            row.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            if let Some(k) = top_k {
                row.truncate(k);
            }
            RankedNeighbours {
                label: (i + 1).to_string(),
                neighbours: row.into_iter().map(|(j, w)| ((j + 1).to_string(), w)).collect(),
            }
        })
        .collect();

    let graph = KnnGraph { nodes };
    info!(
        "Exported ranked adjacency: {} nodes, {} edges, density {:.2}%",
        n,
        graph.nedges(),
        density(similarities) * 100.0
    );
    graph
}

/// Fraction of non-zero entries in a matrix.
pub fn density(matrix: &DenseMatrix<f64>) -> f64 {
    let (n, m) = matrix.shape();
    let total = n * m;
    if total == 0 {
        return 0.0;
    }
    let nnz = (0..n)
        .flat_map(|i| (0..m).map(move |j| (i, j)))
        .filter(|&(i, j)| *matrix.get((i, j)) != 0.0)
        .count();
    debug!("Density: {} of {} entries non-zero", nnz, total);
    nnz as f64 / total as f64
}
