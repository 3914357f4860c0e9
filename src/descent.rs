//! # Full-batch projected gradient descent
//!
//! Minimises the log-barrier objective over the whole edge space at once. The
//! same loop serves the symmetric solver (one weight per unordered pair) and the
//! directed solver (one weight per ordered pair); only the incidence layout and
//! the target vector differ.
//!
//! ## State machine
//!
//! ```text
//! Init ─► Iterate ─┬─► Shrink   (new_obj > obj: gamma /= 2, retry)
//!                  ├─► Accept   (improvement > tol·|prev obj|: gamma *= 1.05)
//!                  ├─► Converged (improvement ≤ tol·|prev obj|: accept, stop)
//!                  └─► Stalled  (gamma < MIN_STEP, stop)
//! ```
//!
//! Shrinks do not count towards `max_iter`; only accepted steps do.
//!
//! ## Invariants
//!
//! - every accepted iterate has strictly positive degrees (its objective is finite),
//! - accepted objectives never increase,
//! - weights stay in the non-negative orthant (projection after each step).

use log::{debug, info, trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::graph::{Convergence, SolveReport, WeightInit};
use crate::incidence::Incidence;
use crate::objective::Objective;
use crate::pairs::Orientation;

/// Step sizes below this are treated as a stalled run.
pub const MIN_STEP: f64 = 1e-14;
/// Step growth after an accepted iterate.
pub const STEP_GROWTH: f64 = 1.05;

/// Settings of a full-batch solve.
#[derive(Clone, Debug, PartialEq)]
pub struct DescentSettings {
    pub max_iter: usize,
    pub init: WeightInit,
    pub seed: u64,
    /// Lipschitz bound of the objective when `None`.
    pub initial_step: Option<f64>,
    /// `0.1 / P` when `None`, `P` the number of unordered pairs.
    pub tolerance: Option<f64>,
    /// Edge layout of the objective; sets `P` for the default tolerance.
    pub orientation: Orientation,
}

impl Default for DescentSettings {
    fn default() -> Self {
        Self {
            max_iter: crate::graph::DEFAULT_MAX_ITER,
            init: WeightInit::RandomBinary,
            seed: crate::graph::DEFAULT_SEED,
            initial_step: None,
            tolerance: None,
            orientation: Orientation::Undirected,
        }
    }
}

/// Draw the starting weights; an infeasible draw falls back to all-ones.
pub(crate) fn initial_weights<S: Incidence>(
    incidence: &S,
    nedges: usize,
    init: WeightInit,
    seed: u64,
) -> Vec<f64> {
    match init {
        WeightInit::Ones => vec![1.0; nedges],
        WeightInit::RandomBinary => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let w: Vec<f64> = (0..nedges)
                .map(|_| if rng.random_bool(0.5) { 1.0 } else { 0.0 })
                .collect();
            let d = incidence.mul_vec(&w);
            if d.iter().all(|&di| di > 0.0) {
                w
            } else {
                warn!("Random binary start leaves a node with zero degree, using all-ones");
                vec![1.0; nedges]
            }
        }
    }
}

/// Projected gradient step `max(w − gamma·grad, 0)`.
#[inline]
pub(crate) fn project_step(w: &[f64], grad: &[f64], gamma: f64) -> Vec<f64> {
    w.iter()
        .zip(grad)
        .map(|(wk, gk)| (wk - gamma * gk).max(0.0))
        .collect()
}

/// Run full-batch projected gradient descent on `objective`.
///
/// # Returns
///
/// A [`SolveReport`] with the last accepted weights. `Convergence::EmptyGraph`
/// when the incidence has no columns.
pub fn projected_gradient<S: Incidence>(
    objective: &Objective<'_, S>,
    settings: &DescentSettings,
) -> SolveReport {
    let (nnodes, nedges) = objective.incidence().shape();
    if nedges == 0 {
        debug!("No edges to optimise over {} nodes", nnodes);
        return SolveReport::empty();
    }

    info!(
        "Projected gradient descent: {} nodes, {} edges, max_iter={}",
        nnodes, nedges, settings.max_iter
    );

    let mut w = initial_weights(objective.incidence(), nedges, settings.init, settings.seed);
    let mut d = objective.degrees(&w);
    let mut obj = objective.value_at(&w, &d);

    let mut gamma = settings.initial_step.unwrap_or_else(|| objective.step_bound());
    let npairs = match settings.orientation {
        Orientation::Undirected => nedges,
        Orientation::Directed => nedges / 2,
    };
    let stop_thresh = settings.tolerance.unwrap_or(0.1 / npairs.max(1) as f64);
    debug!(
        "Initial objective {:.6}, step {:.6e}, stop threshold {:.6e}",
        obj, gamma, stop_thresh
    );

    let mut history = vec![obj];
    let mut iterations = 0;
    let mut shrinks = 0;
    let mut status = Convergence::IterationCap;

    while iterations < settings.max_iter {
        let grad = objective.gradient(&w, &d);
        let new_w = project_step(&w, &grad, gamma);
        let new_d = objective.degrees(&new_w);
        let new_obj = objective.value_at(&new_w, &new_d);

        // NaN and +inf both land here
        if !(new_obj <= obj) {
            gamma /= 2.0;
            shrinks += 1;
            trace!("Rejected step: obj {:.6} -> {:.6}, gamma {:.6e}", obj, new_obj, gamma);
            if gamma < MIN_STEP {
                warn!("Step size collapsed after {} iterations", iterations);
                status = Convergence::Stalled;
                break;
            }
            continue;
        }

        let prev = obj;
        iterations += 1;
        w = new_w;
        d = new_d;
        obj = new_obj;
        history.push(obj);

        if prev - obj > (stop_thresh * prev).abs() {
            gamma *= STEP_GROWTH;
            trace!("it={} obj={:.6} gamma={:.6e}", iterations, obj, gamma);
        } else {
            status = Convergence::Converged;
            break;
        }
    }

    info!(
        "Descent finished: {:?} after {} iterations ({} shrinks), obj={:.6}, gamma={:.6e}",
        status, iterations, shrinks, obj, gamma
    );

    SolveReport {
        weights: w,
        objective: obj,
        iterations,
        shrinks,
        step_size: gamma,
        status,
        history,
    }
}
