//! A worker thread that walks the graph with the classic ACO transition rule.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use aco_core::{CategoricalSampler, NodeId, WorkerId, WorkerRng};
use aco_graph::PheromoneGraph;
use aco_sim::{ActionDescriptor, Colony, Notice};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

/// How long an idle ant waits before checking whether the run ended.
const POLL: Duration = Duration::from_millis(100);

struct Ant {
    id:          WorkerId,
    colony:      Arc<Colony>,
    rng:         WorkerRng,
    alpha:       f64,
    beta:        f64,
    start:       NodeId,
    destination: NodeId,
    /// Nodes walked this cycle, starting with the start node.
    trail:       Vec<NodeId>,
    reported:    bool,
}

impl Ant {
    fn graph(&self) -> &PheromoneGraph {
        self.colony.graph()
    }

    fn reset(&mut self) {
        self.trail.clear();
        self.trail.push(self.start);
        self.reported = false;
    }

    fn here(&self) -> NodeId {
        self.trail.last().copied().unwrap_or(self.start)
    }

    /// Next action for a `TimeAdvanced` notice.
    fn step(&mut self) -> ActionDescriptor {
        let here = self.here();
        if here == self.destination {
            if self.reported {
                return ActionDescriptor::ready();
            }
            self.reported = true;
            let names: Vec<&str> = self.trail.iter().map(|&n| self.graph().node_name(n)).collect();
            return ActionDescriptor::return_to_nest(&names);
        }
        match self.choose(here) {
            Some(next) => {
                self.trail.push(next);
                ActionDescriptor::move_to(self.graph().node_name(next))
            }
            None => ActionDescriptor::ready(),
        }
    }

    /// Pick a neighbour with probability ∝ τ^α · (1/d)^β among unvisited
    /// nodes.  A dead end falls back to visibility alone over every
    /// neighbour.
    fn choose(&mut self, here: NodeId) -> Option<NodeId> {
        let graph = Arc::clone(self.colony.graph());
        let fresh: Vec<(NodeId, f64)> = graph
            .neighbours(here)
            .filter(|(_, n)| !self.trail.contains(n))
            .map(|(e, n)| {
                let edge = graph.edge(e);
                (n, edge.pheromone().powf(self.alpha) * edge.distance().recip().powf(self.beta))
            })
            .collect();
        let candidates = if fresh.is_empty() {
            graph
                .neighbours(here)
                .map(|(e, n)| (n, graph.edge(e).distance().recip().powf(self.beta)))
                .collect()
        } else {
            fresh
        };
        if candidates.is_empty() {
            return None;
        }

        let weights: Vec<f64> = candidates.iter().map(|&(_, w)| w).collect();
        match CategoricalSampler::from_weights(&weights) {
            Ok(sampler) => Some(candidates[sampler.next(self.rng.inner())].0),
            Err(e) => {
                warn!(worker = %self.id, error = %e, "degenerate weights; taking the first road");
                Some(candidates[0].0)
            }
        }
    }

    fn run(mut self, inbox: Receiver<Notice>) -> usize {
        let mut answered = 0;
        loop {
            let notice = match inbox.recv_timeout(POLL) {
                Ok(notice) => notice,
                Err(RecvTimeoutError::Timeout) if self.colony.is_finished() => break,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            let action = match notice {
                Notice::TimeAdvanced(_) => self.step(),
                Notice::NewCycle(_) => {
                    self.reset();
                    ActionDescriptor::ready()
                }
            };
            match self.colony.submit(&self.id, action) {
                Ok(_) => answered += 1,
                Err(e) => {
                    warn!(worker = %self.id, error = %e, "action rejected");
                    break;
                }
            }
        }
        debug!(worker = %self.id, answered, "ant retired");
        answered
    }
}

/// Join the colony as `id` and answer notices from `inbox` until the run ends.
pub fn spawn(colony: Arc<Colony>, id: WorkerId, inbox: Receiver<Notice>) -> anyhow::Result<JoinHandle<usize>> {
    let config = colony.config();
    let ant = Ant {
        rng:         WorkerRng::new(config.seed, &id),
        alpha:       config.alpha,
        beta:        config.beta,
        start:       colony.start_node(),
        destination: colony.destination_node(),
        trail:       vec![colony.start_node()],
        reported:    false,
        id:          id.clone(),
        colony:      Arc::clone(&colony),
    };
    colony.arrive(&id)?;
    let handle = thread::Builder::new()
        .name(format!("ant-{id}"))
        .spawn(move || ant.run(inbox))?;
    Ok(handle)
}
