//! # graph-discovery
//!
//! Learns a weighted similarity graph over a set of entities (users, items,
//! documents) from what they interacted with.
//!
//! Pipeline:
//! 1. group `(entity, item, rating)` records into per-entity item sets
//!    ([`interactions`]),
//! 2. pairwise Jaccard distance between the sets ([`jaccard`]),
//! 3. minimise a log-barrier regularised objective over non-negative edge
//!    weights ([`objective`]) with full-batch projected gradient ([`descent`])
//!    or stochastic block-coordinate descent ([`block`]),
//! 4. scatter the weights back into an `N × N` similarity matrix and export
//!    ranked neighbour lists ([`graph`], [`export`]).
//!
//! ```
//! use graph_discovery::builder::GraphDiscoveryBuilder;
//!
//! let sets = vec![vec!["a", "b"], vec!["b", "c"], vec!["a", "b", "c"], vec!["d"]];
//! let graph = GraphDiscoveryBuilder::new().build(&sets).unwrap();
//! assert_eq!(graph.nnodes(), 4);
//! for i in 0..4 {
//!     for j in 0..4 {
//!         assert!(graph.weight(i, j) >= 0.0);
//!     }
//! }
//! ```

pub mod block;
pub mod builder;
pub mod descent;
pub mod error;
pub mod export;
pub mod graph;
pub mod incidence;
pub mod interactions;
pub mod jaccard;
pub mod objective;
pub mod operators;
pub mod pairs;
pub mod sampling;

pub use builder::GraphDiscoveryBuilder;
pub use error::{Error, Result};
pub use graph::{Convergence, DiscoveryParams, LearnedGraph, SolveReport, SolverMode};

#[cfg(test)]
mod tests;
