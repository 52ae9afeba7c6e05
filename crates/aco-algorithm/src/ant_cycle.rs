//! Dorigo et al. (1996) ant-cycle update.
//!
//! At every cycle boundary, for each edge:
//!
//! ```text
//! τ ← ρ · τ                           (evaporate, once)
//! τ ← τ + Q / L(p)   for each solution path p using the edge
//! ```
//!
//! Nothing happens on individual traversals.

use aco_core::EdgeId;
use aco_graph::PheromoneGraph;
use tracing::debug;

use crate::{AlgoError, AlgoResult, EdgeSolutions, PheromonePolicy, PolicyParams};

#[derive(Debug, Clone, Copy)]
pub struct AntCycle {
    retention: f64,
    q:         f64,
}

impl AntCycle {
    /// Fails unless `retention` is in `[0, 1]` and `q` is finite and positive.
    pub fn new(retention: f64, q: f64) -> AlgoResult<Self> {
        if !(0.0..=1.0).contains(&retention) {
            return Err(AlgoError::Config(format!("retention {retention} is outside [0, 1]")));
        }
        if !q.is_finite() || q <= 0.0 {
            return Err(AlgoError::Config(format!("deposit constant {q} must be positive")));
        }
        Ok(Self { retention, q })
    }

    pub fn from_params(params: &PolicyParams) -> AlgoResult<Self> {
        Self::new(params.retention, params.q)
    }

    pub fn retention(&self) -> f64 {
        self.retention
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    fn update_edge(&self, graph: &PheromoneGraph, edge: EdgeId, solutions: &EdgeSolutions) {
        let retention = self.retention;
        graph.update_pheromone(edge, |tau| retention * tau);
        for path in solutions.get(&edge).into_iter().flatten() {
            let length = path.total_distance();
            if length <= 0.0 {
                debug!(path = %path.label(), "zero-length solution deposits nothing");
                continue;
            }
            let deposit = self.q / length;
            graph.update_pheromone(edge, |tau| tau + deposit);
        }
    }
}

impl PheromonePolicy for AntCycle {
    fn name(&self) -> &'static str {
        "ant-cycle"
    }

    fn end_of_cycle(&self, graph: &PheromoneGraph, solutions: &EdgeSolutions) {
        #[cfg(not(feature = "parallel"))]
        {
            for edge in graph.edge_ids() {
                self.update_edge(graph, edge, solutions);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let edges: Vec<EdgeId> = graph.edge_ids().collect();
            edges.par_iter().for_each(|&edge| self.update_edge(graph, edge, solutions));
        }
    }
}
