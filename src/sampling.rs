use log::{info, trace};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub trait NodeSampler {
    fn new(seed: u64) -> Self;
    /// Draw `amount` distinct node indices out of `0..nnodes`.
    fn sample_nodes(&mut self, nnodes: usize, amount: usize) -> Vec<usize>;
}

/// Uniform sampling without replacement from a seeded ChaCha stream.
pub struct UniformNodeSampler {
    rng: ChaCha8Rng,
    draws: usize,
    sampled: usize,
}

impl UniformNodeSampler {
    /// Number of `sample_nodes` calls so far.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Total node indices handed out across all draws.
    pub fn sampled(&self) -> usize {
        self.sampled
    }
}

impl NodeSampler for UniformNodeSampler {
    fn new(seed: u64) -> Self {
        info!("Uniform node sampler with seed {}", seed);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
            sampled: 0,
        }
    }

    fn sample_nodes(&mut self, nnodes: usize, amount: usize) -> Vec<usize> {
        assert!(
            amount <= nnodes,
            "cannot draw {} distinct nodes out of {}",
            amount,
            nnodes
        );
        self.draws += 1;

        let drawn = index::sample(&mut self.rng, nnodes, amount).into_vec();
        self.sampled += drawn.len();

        trace!("Draw {}: nodes {:?}", self.draws, drawn);
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_samples_are_distinct_and_in_range() {
        let mut sampler = UniformNodeSampler::new(7);
        for _ in 0..200 {
            let drawn = sampler.sample_nodes(10, 4);
            assert_eq!(drawn.len(), 4);
            let unique: HashSet<_> = drawn.iter().copied().collect();
            assert_eq!(unique.len(), 4);
            assert!(drawn.iter().all(|&i| i < 10));
        }
        assert_eq!(sampler.draws(), 200);
        assert_eq!(sampler.sampled(), 800);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = UniformNodeSampler::new(99);
        let mut b = UniformNodeSampler::new(99);
        for _ in 0..50 {
            assert_eq!(a.sample_nodes(30, 3), b.sample_nodes(30, 3));
        }
    }

    #[test]
    #[should_panic(expected = "cannot draw")]
    fn test_oversampling_panics() {
        let mut sampler = UniformNodeSampler::new(1);
        sampler.sample_nodes(2, 3);
    }
}
