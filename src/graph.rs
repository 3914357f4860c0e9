use log::{debug, trace};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{Error, Result};
use crate::export::{ranked_adjacency, KnnGraph};
use crate::incidence::IncidenceKind;
use crate::pairs::{Orientation, PairIndex};

/// Which solver runs the discovery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverMode {
    /// Full-batch projected gradient over unordered pairs.
    #[default]
    Symmetric,
    /// Full-batch projected gradient over ordered pairs.
    Directed,
    /// Stochastic block-coordinate descent over unordered pairs.
    Block,
    /// Stochastic block-coordinate descent over ordered pairs.
    DirectedBlock,
}

impl SolverMode {
    pub fn orientation(self) -> Orientation {
        match self {
            SolverMode::Symmetric | SolverMode::Block => Orientation::Undirected,
            SolverMode::Directed | SolverMode::DirectedBlock => Orientation::Directed,
        }
    }

    pub fn is_block(self) -> bool {
        matches!(self, SolverMode::Block | SolverMode::DirectedBlock)
    }
}

/// Starting point of the edge weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Independent fair coin per edge, drawn from the seeded generator.
    RandomBinary,
    /// Every edge at 1.
    Ones,
}

pub const DEFAULT_MU: f64 = 1.0;
pub const DEFAULT_LAMBDA: f64 = 0.4;
pub const DEFAULT_KAPPA: usize = 1;
pub const DEFAULT_MAX_ITER: usize = 2000;
pub const DEFAULT_BLOCK_MAX_ITER: usize = 10_000;
pub const DEFAULT_RATING_THRESHOLD: f64 = 3.0;
pub const DEFAULT_SEED: u64 = 42;
/// Initial step of the block solver.
pub const DEFAULT_BLOCK_STEP: f64 = 0.5;
/// Relative improvement below which an epoch check of the block solver converges.
pub const DEFAULT_BLOCK_TOLERANCE: f64 = 1e-6;

/// Tunable parameters of a discovery run.
///
/// `None` fields resolve to mode-dependent defaults, see the accessors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryParams {
    /// Barrier sharpness μ.
    pub mu: f64,
    /// Ridge strength λ.
    pub lambda: f64,
    /// Number of partner nodes sampled with each pivot by the block solver.
    pub kappa: usize,
    /// Iteration cap; 2000 full-batch, 10000 block.
    pub max_iter: Option<usize>,
    /// Ratings at or above this value count as positive interactions.
    pub threshold: f64,
    pub seed: u64,
    /// `RandomBinary` full-batch, `Ones` block.
    pub init: Option<WeightInit>,
    /// Lipschitz bound full-batch, 0.5 block.
    pub initial_step: Option<f64>,
    /// Stopping threshold relative to `|obj|`; `0.1 / P` full-batch, `1e-6` block.
    pub tolerance: Option<f64>,
    /// Block solver iterations between objective checks; N by default.
    pub epoch_len: Option<usize>,
    pub mode: SolverMode,
    pub incidence: IncidenceKind,
}

impl Default for DiscoveryParams {
    fn default() -> Self {
        Self {
            mu: DEFAULT_MU,
            lambda: DEFAULT_LAMBDA,
            kappa: DEFAULT_KAPPA,
            max_iter: None,
            threshold: DEFAULT_RATING_THRESHOLD,
            seed: DEFAULT_SEED,
            init: None,
            initial_step: None,
            tolerance: None,
            epoch_len: None,
            mode: SolverMode::default(),
            incidence: IncidenceKind::default(),
        }
    }
}

// Custom PartialEq implementation using approximate equality for floats
impl PartialEq for DiscoveryParams {
    fn eq(&self, other: &Self) -> bool {
        let opt_eq = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => approx::relative_eq!(a, b),
            _ => false,
        };
        approx::relative_eq!(self.mu, other.mu)
            && approx::relative_eq!(self.lambda, other.lambda)
            && approx::relative_eq!(self.threshold, other.threshold)
            && self.kappa == other.kappa
            && self.max_iter == other.max_iter
            && self.seed == other.seed
            && self.init == other.init
            && opt_eq(self.initial_step, other.initial_step)
            && opt_eq(self.tolerance, other.tolerance)
            && self.epoch_len == other.epoch_len
            && self.mode == other.mode
            && self.incidence == other.incidence
    }
}

impl DiscoveryParams {
    pub fn max_iter(&self) -> usize {
        self.max_iter.unwrap_or(if self.mode.is_block() {
            DEFAULT_BLOCK_MAX_ITER
        } else {
            DEFAULT_MAX_ITER
        })
    }

    pub fn init(&self) -> WeightInit {
        self.init.unwrap_or(if self.mode.is_block() {
            WeightInit::Ones
        } else {
            WeightInit::RandomBinary
        })
    }

    /// Check ranges before any work is done.
    pub fn validate(&self) -> Result<()> {
        if !(self.mu.is_finite() && self.mu > 0.0) {
            return Err(Error::invalid("mu", format!("must be finite and > 0, got {}", self.mu)));
        }
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(Error::invalid(
                "lambda",
                format!("must be finite and >= 0, got {}", self.lambda),
            ));
        }
        if self.kappa == 0 {
            return Err(Error::invalid("kappa", "must be at least 1"));
        }
        if self.max_iter == Some(0) {
            return Err(Error::invalid("max_iter", "must be at least 1"));
        }
        if self.epoch_len == Some(0) {
            return Err(Error::invalid("epoch_len", "must be at least 1"));
        }
        if let Some(step) = self.initial_step {
            if !(step.is_finite() && step > 0.0) {
                return Err(Error::invalid(
                    "initial_step",
                    format!("must be finite and > 0, got {step}"),
                ));
            }
        }
        if let Some(tol) = self.tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(Error::invalid(
                    "tolerance",
                    format!("must be finite and >= 0, got {tol}"),
                ));
            }
        }
        if !self.threshold.is_finite() {
            return Err(Error::invalid("threshold", "must be finite"));
        }
        Ok(())
    }
}

/// How a solve ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// Relative improvement fell below the stopping threshold.
    Converged,
    /// `max_iter` was reached first.
    IterationCap,
    /// The step size collapsed while every candidate step was rejected.
    Stalled,
    /// Fewer than two nodes: nothing to optimise.
    EmptyGraph,
}

/// Outcome of a solver run.
#[derive(Clone, Debug)]
pub struct SolveReport {
    /// Final edge weights, in edge-index order.
    pub weights: Vec<f64>,
    /// Objective at `weights`.
    pub objective: f64,
    /// Iterations performed (accepted steps for full-batch, coordinate
    /// updates for block).
    pub iterations: usize,
    /// Rejected candidates that halved the step.
    pub shrinks: usize,
    /// Step size when the run stopped.
    pub step_size: f64,
    pub status: Convergence,
    /// Objective of every accepted state, starting with the initial one.
    pub history: Vec<f64>,
}

impl SolveReport {
    pub(crate) fn empty() -> Self {
        Self {
            weights: Vec::new(),
            objective: 0.0,
            iterations: 0,
            shrinks: 0,
            step_size: 0.0,
            status: Convergence::EmptyGraph,
            history: Vec::new(),
        }
    }

    pub fn converged(&self) -> bool {
        self.status == Convergence::Converged
    }
}

/// Scatter edge weights back into an `N × N` similarity matrix.
///
/// Undirected weights are mirrored across the diagonal; directed weights land
/// at `(src, dst)`. The diagonal stays zero.
pub fn similarity_matrix(
    pairs: &PairIndex,
    weights: &[f64],
    orientation: Orientation,
) -> DenseMatrix<f64> {
    let n = pairs.nnodes();
    assert_eq!(
        weights.len(),
        pairs.nedges(orientation),
        "weights must cover the {:?} edge space",
        orientation
    );
    trace!("Reconstructing {}x{} similarity matrix", n, n);

    let mut matrix = DenseMatrix::zeros(n, n);
    match orientation {
        Orientation::Undirected => {
            for (k, &(i, j)) in pairs.coordinates().iter().enumerate() {
                matrix.set((i, j), weights[k]);
                matrix.set((j, i), weights[k]);
            }
        }
        Orientation::Directed => {
            for (c, &w) in weights.iter().enumerate() {
                let (src, dst) = pairs.directed_pair(c);
                matrix.set((src, dst), w);
            }
        }
    }
    matrix
}

/// A learned similarity graph together with the run that produced it.
#[derive(Clone, Debug)]
pub struct LearnedGraph {
    /// `N × N`, non-negative, zero diagonal.
    pub similarities: DenseMatrix<f64>,
    /// Jaccard similarity (`1 − distance`) the graph was fitted to.
    pub jaccard: DenseMatrix<f64>,
    pub report: SolveReport,
    pub mode: SolverMode,
}

impl LearnedGraph {
    pub fn nnodes(&self) -> usize {
        self.similarities.shape().0
    }

    /// Learned weight from `i` to `j`.
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        *self.similarities.get((i, j))
    }

    pub fn is_directed(&self) -> bool {
        self.mode.orientation() == Orientation::Directed
    }

    /// Ranked neighbour lists, see [`ranked_adjacency`].
    pub fn knn_graph(&self, top_k: Option<usize>) -> KnnGraph {
        debug!(
            "Exporting {} nodes (top_k={:?}) from a {:?} run",
            self.nnodes(),
            top_k,
            self.report.status
        );
        ranked_adjacency(&self.similarities, top_k)
    }
}
