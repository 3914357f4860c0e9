//! Vector kernels shared by the objective and the solvers.
//!
//! - Euclidean norm and dot product without allocation
//! - Largest eigenvalue of `S·Sᵗ` by power iteration, i.e. the spectral norm of
//!   the Gram matrix `SᵗS` that bounds the gradient's Lipschitz constant

use log::{debug, trace};

use crate::incidence::Incidence;

/// Computes the Euclidean norm (L2) without allocating.
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

const POWER_MAX_ITERS: usize = 100;
const POWER_TOL: f64 = 1e-9;

/// Spectral norm `‖SᵗS‖₂`.
///
/// `SᵗS` and `S·Sᵗ` share their non-zero spectrum, so the iteration runs on the
/// N-dimensional side. Starts from the all-ones vector, which is already the
/// leading eigenvector for both incidence layouts built by this crate.
pub fn gram_spectral_norm<S: Incidence>(incidence: &S) -> f64 {
    let (n, m) = incidence.shape();
    if n == 0 || m == 0 {
        return 0.0;
    }

    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    let mut lambda = 0.0;
    for it in 0..POWER_MAX_ITERS {
        let y = incidence.mul_vec(&incidence.transpose_mul_vec(&x));
        let next = norm(&y);
        if next <= 0.0 {
            return 0.0;
        }
        x = y.into_iter().map(|v| v / next).collect();

        let delta = (next - lambda).abs();
        lambda = next;
        trace!("power iteration {}: lambda={:.6}", it, lambda);
        if delta <= POWER_TOL * lambda {
            break;
        }
    }

    debug!("Gram spectral norm for {}x{} incidence: {:.6}", n, m, lambda);
    lambda
}
