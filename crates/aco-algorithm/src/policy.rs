//! The `PheromonePolicy` trait: the variant-specific part of an algorithm.

use std::collections::HashMap;
use std::sync::Arc;

use aco_core::{ColonyConfig, EdgeId};
use aco_graph::{Path, PheromoneGraph};

/// Solution paths of one cycle, indexed by every edge they traverse.
pub type EdgeSolutions = HashMap<EdgeId, Vec<Arc<Path>>>;

/// Numeric parameters shared by the registered policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyParams {
    /// Retention factor ρ in `[0, 1]`.
    pub retention: f64,
    /// Deposit constant Q (> 0).
    pub q: f64,
}

impl PolicyParams {
    pub fn from_config(config: &ColonyConfig) -> Self {
        Self { retention: config.retention, q: config.q }
    }
}

/// Pheromone update rules.
///
/// Hooks are called concurrently: `on_traversal` from the action pool while
/// workers move, `end_of_cycle` once per cycle boundary from the tick thread.
/// Both hooks default to doing nothing.
pub trait PheromonePolicy: Send + Sync + 'static {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// A worker walked `edge` this iteration.
    fn on_traversal(&self, _graph: &PheromoneGraph, _edge: EdgeId) {}

    /// A cycle closed with `solutions` (paths that reached the destination).
    fn end_of_cycle(&self, _graph: &PheromoneGraph, _solutions: &EdgeSolutions) {}
}
