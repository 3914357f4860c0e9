use std::hash::Hash;

use log::{debug, info, trace};
use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::block::{block_coordinate_descent, BlockSettings};
use crate::descent::{projected_gradient, DescentSettings};
use crate::error::{Error, Result};
use crate::graph::{
    similarity_matrix, DiscoveryParams, LearnedGraph, SolveReport, SolverMode, WeightInit,
    DEFAULT_BLOCK_STEP, DEFAULT_BLOCK_TOLERANCE,
};
use crate::incidence::{DenseIncidence, Incidence, IncidenceKind, SparseIncidence};
use crate::interactions::{group_by_entity, item_sets, Interaction};
use crate::jaccard::{jaccard_distance_matrix, similarity_from_distance};
use crate::objective::Objective;
use crate::pairs::PairIndex;

/// Configures and runs a graph discovery.
///
/// ```
/// use graph_discovery::builder::GraphDiscoveryBuilder;
/// use graph_discovery::graph::SolverMode;
///
/// let item_sets = vec![vec![1, 2], vec![2, 3], vec![1, 2, 3]];
/// let graph = GraphDiscoveryBuilder::new()
///     .with_lambda(0.4)
///     .with_mode(SolverMode::Symmetric)
///     .with_seed(7)
///     .build(&item_sets)
///     .unwrap();
///
/// assert_eq!(graph.nnodes(), 3);
/// assert_eq!(graph.weight(0, 1), graph.weight(1, 0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct GraphDiscoveryBuilder {
    params: DiscoveryParams,
    losses: Option<Vec<f64>>,
}

impl GraphDiscoveryBuilder {
    pub fn new() -> Self {
        info!("Initializing new GraphDiscoveryBuilder");
        Self::default()
    }

    /// Start from a complete parameter set, e.g. one deserialised from a config file.
    pub fn from_params(params: DiscoveryParams) -> Self {
        debug!("GraphDiscoveryBuilder from params: {:?}", params);
        Self { params, losses: None }
    }

    pub fn params(&self) -> &DiscoveryParams {
        &self.params
    }

    // -------------------- Objective --------------------

    /// Barrier sharpness μ.
    pub fn with_mu(mut self, mu: f64) -> Self {
        info!("Setting mu: {}", mu);
        self.params.mu = mu;
        self
    }

    /// Ridge strength λ.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        info!("Setting lambda: {}", lambda);
        self.params.lambda = lambda;
        self
    }

    /// Per-node loss weighting added to the objective as `ℓ·(S·w)`.
    pub fn with_losses(mut self, losses: Vec<f64>) -> Self {
        info!("Setting per-node losses for {} nodes", losses.len());
        self.losses = Some(losses);
        self
    }

    // -------------------- Solver --------------------

    pub fn with_mode(mut self, mode: SolverMode) -> Self {
        info!("Setting solver mode: {:?}", mode);
        self.params.mode = mode;
        self
    }

    /// Partners sampled with each pivot by the block solvers.
    pub fn with_kappa(mut self, kappa: usize) -> Self {
        info!("Setting kappa: {}", kappa);
        self.params.kappa = kappa;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        info!("Setting max_iter: {}", max_iter);
        self.params.max_iter = Some(max_iter);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        debug!("Setting seed: {}", seed);
        self.params.seed = seed;
        self
    }

    pub fn with_init(mut self, init: WeightInit) -> Self {
        debug!("Setting weight init: {:?}", init);
        self.params.init = Some(init);
        self
    }

    pub fn with_initial_step(mut self, step: f64) -> Self {
        debug!("Setting initial step: {}", step);
        self.params.initial_step = Some(step);
        self
    }

    /// Relative stopping threshold.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        debug!("Setting tolerance: {}", tolerance);
        self.params.tolerance = Some(tolerance);
        self
    }

    /// Block solver iterations between full objective checks.
    pub fn with_epoch_len(mut self, epoch_len: usize) -> Self {
        debug!("Setting epoch length: {}", epoch_len);
        self.params.epoch_len = Some(epoch_len);
        self
    }

    pub fn with_incidence(mut self, kind: IncidenceKind) -> Self {
        info!("Setting incidence representation: {:?}", kind);
        self.params.incidence = kind;
        self
    }

    // -------------------- Input --------------------

    /// Rating cutoff used by [`Self::build_from_interactions`].
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        info!("Setting rating threshold: {}", threshold);
        self.params.threshold = threshold;
        self
    }

    // -------------------- Build --------------------

    /// Group raw interactions and learn the graph from the items rated at or
    /// above the threshold.
    ///
    /// Nodes follow the order in which entities first appear.
    pub fn build_from_interactions<E, I>(
        self,
        records: impl IntoIterator<Item = Interaction<E, I>>,
    ) -> Result<LearnedGraph>
    where
        E: Eq + Hash + Clone,
        I: Eq + Hash + Clone + Sync,
    {
        let groups = group_by_entity(records, self.params.threshold);
        self.build(&item_sets(&groups, true))
    }

    /// Learn the graph from per-entity item sets.
    pub fn build<I>(self, item_sets: &[Vec<I>]) -> Result<LearnedGraph>
    where
        I: Eq + Hash + Sync,
    {
        self.params.validate()?;
        let distances = jaccard_distance_matrix(item_sets)?;
        self.build_from_distances(&distances)
    }

    /// Learn the graph from a precomputed `N × N` distance matrix.
    pub fn build_from_distances(self, distances: &DenseMatrix<f64>) -> Result<LearnedGraph> {
        self.params.validate()?;

        let (n, m) = distances.shape();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if n != m {
            return Err(Error::DimensionMismatch { what: "distance columns", expected: n, found: m });
        }
        if let Some(losses) = &self.losses {
            if losses.len() != n {
                return Err(Error::DimensionMismatch {
                    what: "per-node losses",
                    expected: n,
                    found: losses.len(),
                });
            }
            if losses.iter().any(|l| !l.is_finite()) {
                return Err(Error::invalid("losses", "must be finite"));
            }
        }

        for i in 0..n {
            for j in 0..n {
                let z = *distances.get((i, j));
                if !(0.0..=1.0).contains(&z) {
                    return Err(Error::invalid(
                        "distances",
                        format!("entry ({i}, {j}) = {z} is outside [0, 1]"),
                    ));
                }
            }
        }

        let mode = self.params.mode;
        let kind = self.params.incidence.resolve(n);
        info!("Building {:?} graph over {} nodes with {:?} incidence", mode, n, kind);
        debug!("Discovery parameters: {:?}", self.params);

        let pairs = PairIndex::new(n);
        let report = if pairs.is_degenerate() {
            info!("Fewer than two nodes: returning an empty graph");
            SolveReport::empty()
        } else {
            match kind {
                IncidenceKind::Sparse => self.solve::<SparseIncidence>(&pairs, distances),
                _ => self.solve::<DenseIncidence>(&pairs, distances),
            }
        };

        let similarities = if report.weights.is_empty() {
            DenseMatrix::zeros(n, n)
        } else {
            similarity_matrix(&pairs, &report.weights, mode.orientation())
        };

        let stats = {
            let (sum, max) = report
                .weights
                .iter()
                .fold((0.0, 0.0f64), |(s, mx), &w| (s + w, mx.max(w)));
            let zeros = report.weights.iter().filter(|&&w| w == 0.0).count();
            (sum, max, zeros)
        };
        debug!(
            "Learned weights - sum: {:.6}, max: {:.6}, zero edges: {}",
            stats.0, stats.1, stats.2
        );

        info!("Graph discovery completed: {:?}", report.status);
        Ok(LearnedGraph {
            similarities,
            jaccard: similarity_from_distance(distances),
            report,
            mode,
        })
    }

    fn solve<S: Incidence>(&self, pairs: &PairIndex, distances: &DenseMatrix<f64>) -> SolveReport {
        let orientation = self.params.mode.orientation();
        let targets = pairs.targets(distances, orientation);
        let incidence: S = pairs.incidence(orientation);
        trace!("Incidence shape {:?}, nnz {}", incidence.shape(), incidence.nnz());

        let mut objective = Objective::new(&incidence, &targets, self.params.mu, self.params.lambda);
        if let Some(losses) = &self.losses {
            objective = objective.with_losses(losses);
        }

        if self.params.mode.is_block() {
            let settings = BlockSettings {
                kappa: self.params.kappa,
                max_iter: self.params.max_iter(),
                init: self.params.init(),
                seed: self.params.seed,
                initial_step: self.params.initial_step.unwrap_or(DEFAULT_BLOCK_STEP),
                tolerance: self.params.tolerance.unwrap_or(DEFAULT_BLOCK_TOLERANCE),
                epoch_len: self.params.epoch_len,
            };
            block_coordinate_descent(&objective, pairs, orientation, &settings)
        } else {
            let settings = DescentSettings {
                max_iter: self.params.max_iter(),
                init: self.params.init(),
                seed: self.params.seed,
                initial_step: self.params.initial_step,
                tolerance: self.params.tolerance,
                orientation,
            };
            projected_gradient(&objective, &settings)
        }
    }
}
