//! # Stochastic block-coordinate descent
//!
//! For graphs where a full `P`-dimensional gradient per step is too expensive.
//! Each iteration samples `1 + kappa` distinct nodes, takes the first as pivot
//! and updates only the edges between the pivot and the others:
//!
//! 1. `rows` = sampled nodes, `block` = edges pivot–others (directed: both
//!    directions)
//! 2. `d_block = S[rows, :]·w`, `S_block = S[rows, block]`
//! 3. `grad = ℓ[rows]·S_block + (μ/2)·(z[block] − (1/d_block)·S_block + 2·λ·(μ/2)·w[block])`
//! 4. `w[block] = max(w[block] − gamma·grad, 0)`
//!
//! Updates between checkpoints are optimistic. Every `epoch_len` iterations
//! (N by default) the full objective is evaluated:
//!
//! - regression: halve gamma, roll back to the last accepted weights
//! - improvement below `tol·|obj|`: accept and stop
//! - otherwise: accept and grow gamma by 5%
//!
//! Full evaluation is `O(N²)`; spread over N coordinate steps the average cost
//! per iteration stays `O(N)`. Monotonicity holds across checkpoints only.

use log::{debug, info, trace, warn};
use smartcore::linalg::basic::arrays::Array;

use crate::descent::{initial_weights, MIN_STEP, STEP_GROWTH};
use crate::graph::{
    Convergence, SolveReport, WeightInit, DEFAULT_BLOCK_MAX_ITER, DEFAULT_BLOCK_STEP,
    DEFAULT_BLOCK_TOLERANCE, DEFAULT_KAPPA, DEFAULT_SEED,
};
use crate::incidence::Incidence;
use crate::objective::Objective;
use crate::pairs::{Orientation, PairIndex};
use crate::sampling::{NodeSampler, UniformNodeSampler};

/// Settings of a block-coordinate solve.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSettings {
    pub kappa: usize,
    pub max_iter: usize,
    pub init: WeightInit,
    pub seed: u64,
    pub initial_step: f64,
    pub tolerance: f64,
    /// Iterations between objective checks; N when `None`.
    pub epoch_len: Option<usize>,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            kappa: DEFAULT_KAPPA,
            max_iter: DEFAULT_BLOCK_MAX_ITER,
            init: WeightInit::Ones,
            seed: DEFAULT_SEED,
            initial_step: DEFAULT_BLOCK_STEP,
            tolerance: DEFAULT_BLOCK_TOLERANCE,
            epoch_len: None,
        }
    }
}

/// Edges touched by one sampled block.
pub(crate) fn active_block(
    pairs: &PairIndex,
    orientation: Orientation,
    pivot: usize,
    others: &[usize],
) -> Vec<usize> {
    let mut block = Vec::with_capacity(others.len() * 2);
    for &o in others {
        match orientation {
            Orientation::Undirected => block.extend(pairs.edge(pivot, o)),
            Orientation::Directed => {
                block.extend(pairs.directed_edge(pivot, o));
                block.extend(pairs.directed_edge(o, pivot));
            }
        }
    }
    block
}

/// Run stochastic block-coordinate descent on `objective`.
///
/// Per-node losses attached to `objective` enter the block gradient.
/// `kappa` is clamped to `N - 1`.
pub fn block_coordinate_descent<S: Incidence>(
    objective: &Objective<'_, S>,
    pairs: &PairIndex,
    orientation: Orientation,
    settings: &BlockSettings,
) -> SolveReport {
    let incidence = objective.incidence();
    let (nnodes, nedges) = incidence.shape();
    if nedges == 0 || nnodes < 2 {
        debug!("No edges to optimise over {} nodes", nnodes);
        return SolveReport::empty();
    }
    assert_eq!(nedges, pairs.nedges(orientation), "incidence and pair map disagree");

    let kappa = settings.kappa.clamp(1, nnodes - 1);
    if kappa != settings.kappa {
        warn!("kappa={} exceeds N-1, clamped to {}", settings.kappa, kappa);
    }
    let epoch_len = settings.epoch_len.unwrap_or(nnodes).max(1);

    info!(
        "Block-coordinate descent: {} nodes, {} edges, kappa={}, epoch={}, max_iter={}",
        nnodes, nedges, kappa, epoch_len, settings.max_iter
    );

    let half_mu = objective.mu() / 2.0;
    let ridge = objective.ridge();
    let targets = objective.targets();
    let losses = objective.losses();

    let mut sampler = UniformNodeSampler::new(settings.seed);
    let mut w = initial_weights(incidence, nedges, settings.init, settings.seed);
    let mut obj = objective.value(&w);
    let mut pending = w.clone();
    let mut gamma = settings.initial_step;
    debug!("Initial objective {:.6}, step {:.6e}", obj, gamma);

    let mut history = vec![obj];
    let mut shrinks = 0;
    let mut skipped = 0;
    let mut iterations = 0;
    let mut status = Convergence::IterationCap;

    for k in 0..settings.max_iter {
        iterations = k + 1;

        let rows = sampler.sample_nodes(nnodes, 1 + kappa);
        let (pivot, others) = (rows[0], &rows[1..]);
        let block = active_block(pairs, orientation, pivot, others);

        let d_block = incidence.slice_rows_mul_vec(&rows, &pending);
        if d_block.iter().all(|&d| d > 0.0) {
            let s_block = incidence.block(&rows, &block);
            for (c, &edge) in block.iter().enumerate() {
                let mut grad = half_mu * (targets[edge] + ridge * pending[edge]);
                for (r, &node) in rows.iter().enumerate() {
                    let s = *s_block.get((r, c));
                    if s != 0.0 {
                        let loss = losses.map(|l| l[node]).unwrap_or(0.0);
                        grad += s * (loss - half_mu / d_block[r]);
                    }
                }
                pending[edge] = (pending[edge] - gamma * grad).max(0.0);
            }
        } else {
            // infeasible pending state; the next checkpoint rolls it back
            skipped += 1;
            trace!("Skipping block at iteration {}: non-positive sampled degree", k);
        }

        if (k + 1) % epoch_len != 0 {
            continue;
        }

        let new_obj = objective.value(&pending);
        if !(new_obj <= obj) {
            gamma /= 2.0;
            shrinks += 1;
            pending.copy_from_slice(&w);
            trace!("Epoch rejected: obj {:.6} -> {:.6}, gamma {:.6e}", obj, new_obj, gamma);
            if gamma < MIN_STEP {
                warn!("Step size collapsed after {} iterations", iterations);
                status = Convergence::Stalled;
                break;
            }
        } else if obj - new_obj < obj.abs() * settings.tolerance {
            w.copy_from_slice(&pending);
            obj = new_obj;
            history.push(obj);
            status = Convergence::Converged;
            break;
        } else {
            w.copy_from_slice(&pending);
            obj = new_obj;
            history.push(obj);
            gamma *= STEP_GROWTH;
            trace!("Epoch accepted at it={} obj={:.6} gamma={:.6e}", iterations, obj, gamma);
        }
    }

    info!(
        "Block descent finished: {:?} after {} iterations ({} shrinks, {} skipped blocks), obj={:.6}, gamma={:.6e}",
        status, iterations, shrinks, skipped, obj, gamma
    );
    debug!("Sampler: {} draws, {} nodes visited", sampler.draws(), sampler.sampled());

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
