//! Random-variate sampling
//!
//! One seeded source per simulation, so a run is fully reproducible from a
//! single seed.

use rand::prelude::*;
use rand_distr::{Exp, Normal};

/// The simulation's random source.
///
/// Wraps a `StdRng` and exposes the variates the models use. Distribution
/// parameters are validated by callers (configuration is checked before a
/// run starts), so construction failures here are programmer errors.
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Uniform draw in [lo, hi).
    pub fn uniform_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.uniform()
    }

    /// Exponential draw with the given mean (mean must be positive).
    pub fn exponential(&mut self, mean: f64) -> f64 {
        let dist = Exp::new(1.0 / mean).unwrap();
        self.rng.sample(dist)
    }

    /// Normal draw (std_dev must be non-negative).
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let dist = Normal::new(mean, std_dev).unwrap();
        self.rng.sample(dist)
    }

    /// Pick an index from categorical weights (weights must sum to ~1).
    pub fn categorical(&mut self, weights: &[f64]) -> usize {
        let u = self.uniform();
        let mut acc = 0.0;
        for (i, w) in weights.iter().enumerate() {
            acc += w;
            if u < acc {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }
}
