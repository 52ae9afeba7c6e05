//! `StochasticGreedy`, the no-learning baseline.

use crate::PheromonePolicy;

/// Leaves pheromone untouched, so workers choose by edge visibility alone.
///
/// Useful as a baseline: any improvement `AntCycle` shows over this policy
/// comes from pheromone feedback.
pub struct StochasticGreedy;

impl PheromonePolicy for StochasticGreedy {
    fn name(&self) -> &'static str {
        "stochastic-greedy"
    }
}
