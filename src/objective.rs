//! # Log-barrier regularised graph-discovery objective
//!
//! For edge weights `w ≥ 0`, targets `z`, incidence `S` and degrees `d = S·w`:
//!
//! ```text
//! f(w) = ℓ·d + (μ/2) · ( w·z − Σ ln dᵢ + λ·(μ/2)·w·w )
//! ```
//!
//! - `w·z` pulls weight away from distant pairs,
//! - `−Σ ln dᵢ` diverges as any node loses all incident weight, so every node
//!   keeps a positive degree,
//! - `λ·(μ/2)·w·w` is a ridge penalty,
//! - `ℓ` is an optional per-node loss weighting (zero by default).
//!
//! The function is `+∞` outside the barrier domain (`dᵢ ≤ 0` for some `i`),
//! which the solvers read as "shrink the step".

use crate::incidence::Incidence;
use crate::operators::{dot, gram_spectral_norm, norm};

/// Objective value for a candidate weight vector.
///
/// Returns `f64::INFINITY` when some degree is not strictly positive.
pub fn objective<S: Incidence>(w: &[f64], z: &[f64], s: &S, mu: f64, lambda: f64) -> f64 {
    Objective::new(s, z, mu, lambda).value(w)
}

/// The objective bound to its fixed inputs.
#[derive(Debug)]
pub struct Objective<'a, S: Incidence> {
    incidence: &'a S,
    targets: &'a [f64],
    losses: Option<&'a [f64]>,
    mu: f64,
    lambda: f64,
}

impl<'a, S: Incidence> Objective<'a, S> {
    pub fn new(incidence: &'a S, targets: &'a [f64], mu: f64, lambda: f64) -> Self {
        assert_eq!(
            incidence.shape().1,
            targets.len(),
            "targets must have one entry per incidence column"
        );
        Self { incidence, targets, losses: None, mu, lambda }
    }

    /// Attach per-node losses. An all-zero vector is the same as none.
    pub fn with_losses(mut self, losses: &'a [f64]) -> Self {
        assert_eq!(
            self.incidence.shape().0,
            losses.len(),
            "losses must have one entry per node"
        );
        self.losses = Some(losses);
        self
    }

    pub fn incidence(&self) -> &'a S {
        self.incidence
    }

    pub fn targets(&self) -> &'a [f64] {
        self.targets
    }

    pub fn losses(&self) -> Option<&'a [f64]> {
        self.losses
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Coefficient of `w` in the ridge gradient: `2·λ·(μ/2)`.
    #[inline]
    pub fn ridge(&self) -> f64 {
        2.0 * self.lambda * (self.mu / 2.0)
    }

    pub fn degrees(&self, w: &[f64]) -> Vec<f64> {
        self.incidence.mul_vec(w)
    }

    pub fn value(&self, w: &[f64]) -> f64 {
        let d = self.degrees(w);
        self.value_at(w, &d)
    }

    /// Objective value with degrees `d = S·w` already computed.
    pub fn value_at(&self, w: &[f64], d: &[f64]) -> f64 {
        if d.iter().any(|&di| !(di > 0.0 && di.is_finite())) {
            return f64::INFINITY;
        }

        let half_mu = self.mu / 2.0;
        let barrier: f64 = d.iter().map(|di| di.ln()).sum();
        let smooth = dot(w, self.targets) - barrier + self.lambda * half_mu * dot(w, w);
        let local = self.losses.map(|l| dot(l, d)).unwrap_or(0.0);

        local + half_mu * smooth
    }

    /// `∇f(w) = Sᵗℓ + (μ/2)·(z − Sᵗ(1/d) + 2·λ·(μ/2)·w)`
    ///
    /// Both `Sᵗ` products are fused into one.
    pub fn gradient(&self, w: &[f64], d: &[f64]) -> Vec<f64> {
        let half_mu = self.mu / 2.0;
        let node_terms: Vec<f64> = match self.losses {
            Some(l) => d.iter().zip(l).map(|(di, li)| li - half_mu / di).collect(),
            None => d.iter().map(|di| -half_mu / di).collect(),
        };
        let scattered = self.incidence.transpose_mul_vec(&node_terms);
        let ridge = self.ridge();

        scattered
            .into_iter()
            .zip(self.targets.iter().zip(w))
            .map(|(s, (zk, wk))| s + half_mu * (zk + ridge * wk))
            .collect()
    }

    /// Initial step from the Lipschitz bound of the smooth part:
    /// `1 / (‖Sᵗℓ‖ + (μ/2)·(‖z‖ + ‖SᵗS‖₂ + 2·λ·(μ/2)))`.
    pub fn step_bound(&self) -> f64 {
        let losses_term = self
            .losses
            .map(|l| norm(&self.incidence.transpose_mul_vec(l)))
            .unwrap_or(0.0);
        let denom = losses_term
            + (self.mu / 2.0)
                * (norm(self.targets) + gram_spectral_norm(self.incidence) + self.ridge());
        1.0 / denom
    }
}
