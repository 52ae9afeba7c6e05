//! O(1) categorical sampling with Vose's alias method.
//!
//! Construction is O(n): every outcome gets one column of height `1/n`,
//! split between the outcome itself (`prob[i]`) and one "alias" outcome that
//! fills the rest of the column.  A draw picks a column uniformly and then
//! flips one biased coin, so it costs one uniform variate regardless of `n`.

use rand::Rng;
use rand::distributions::Distribution;

use crate::{AcoError, AcoResult};

/// Allowed deviation of a pmf's sum from 1.
pub const SUM_TOLERANCE: f64 = 1e-7;

/// A prepared categorical distribution over `0..n`.
#[derive(Debug, Clone)]
pub struct CategoricalSampler {
    prob:  Vec<f64>,
    alias: Vec<usize>,
}

impl CategoricalSampler {
    /// Build a sampler from a probability mass function.
    ///
    /// Fails with [`AcoError::InvalidDistribution`] if `pmf` is empty, holds
    /// a negative or non-finite entry, or does not sum to 1 within
    /// [`SUM_TOLERANCE`].
    pub fn new(pmf: &[f64]) -> AcoResult<Self> {
        if pmf.is_empty() {
            return Err(AcoError::InvalidDistribution("empty pmf".into()));
        }
        if let Some((i, p)) = pmf.iter().enumerate().find(|(_, p)| !p.is_finite() || **p < 0.0) {
            return Err(AcoError::InvalidDistribution(format!(
                "entry {i} is {p}, expected a finite non-negative probability"
            )));
        }
        let sum: f64 = pmf.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(AcoError::InvalidDistribution(format!("pmf sums to {sum}, expected 1")));
        }

        let n = pmf.len();
        let average = 1.0 / n as f64;
        let mut remaining = pmf.to_vec();
        let mut prob = vec![0.0; n];
        let mut alias = vec![0; n];

        let mut small = Vec::with_capacity(n);
        let mut large = Vec::with_capacity(n);
        for (i, &p) in remaining.iter().enumerate() {
            if p > average { large.push(i) } else { small.push(i) }
        }

        while let (Some(&l), Some(&g)) = (small.last(), large.last()) {
            small.pop();
            large.pop();

            prob[l] = remaining[l] * n as f64;
            alias[l] = g;

            remaining[g] = (remaining[g] + remaining[l]) - average;
            if remaining[g] > average { large.push(g) } else { small.push(g) }
        }

        // Leftovers are full columns; rounding error must not push them below 1.
        for i in small.into_iter().chain(large) {
            prob[i] = 1.0;
        }

        Ok(Self { prob, alias })
    }

    /// Normalise arbitrary non-negative weights into a pmf, then build.
    ///
    /// Fails if any weight is negative or non-finite, or if they sum to zero.
    pub fn from_weights(weights: &[f64]) -> AcoResult<Self> {
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(AcoError::InvalidDistribution(format!(
                "weights sum to {total}, expected a positive finite total"
            )));
        }
        let pmf: Vec<f64> = weights.iter().map(|w| w / total).collect();
        Self::new(&pmf)
    }

    /// Number of outcomes.
    #[inline]
    pub fn len(&self) -> usize {
        self.prob.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Draw one outcome index.
    #[inline]
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.prob.len();
        let u = rng.r#gen::<f64>() * n as f64;
        let column = (u.floor() as usize).min(n - 1);
        if u - column as f64 <= self.prob[column] {
            column
        } else {
            self.alias[column]
        }
    }
}

impl Distribution<usize> for CategoricalSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.next(rng)
    }
}
