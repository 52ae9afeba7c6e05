//! Where each worker currently is.

use std::sync::{Arc, Mutex};

use aco_core::{NodeId, WorkerId};
use aco_graph::PheromoneGraph;
use tracing::trace;

use crate::lock;

#[cfg(feature = "fx-hash")]
type PositionMap = rustc_hash::FxHashMap<WorkerId, NodeId>;
#[cfg(not(feature = "fx-hash"))]
type PositionMap = std::collections::HashMap<WorkerId, NodeId>;

/// Worker → node map that keeps the graph's per-node worker counts in step.
///
/// Every mutation updates the map and the affected node counters under the
/// map lock, so a node's count always equals the number of workers mapped
/// to it once the call returns.
pub struct WorkerLocator {
    graph:     Arc<PheromoneGraph>,
    positions: Mutex<PositionMap>,
}

impl WorkerLocator {
    pub fn new(graph: Arc<PheromoneGraph>) -> Self {
        Self { graph, positions: Mutex::new(PositionMap::default()) }
    }

    /// Put a new worker at `node`.  Returns `false` if it is already placed.
    pub fn place(&self, worker: &WorkerId, node: NodeId) -> bool {
        let mut positions = lock(&self.positions);
        if positions.contains_key(worker) {
            return false;
        }
        self.graph.node(node).add_worker();
        positions.insert(worker.clone(), node);
        true
    }

    /// Move a placed worker.  Returns its previous node, or `None` (and does
    /// nothing) if the worker is unknown.
    pub fn move_to(&self, worker: &WorkerId, node: NodeId) -> Option<NodeId> {
        let mut positions = lock(&self.positions);
        let slot = positions.get_mut(worker)?;
        let previous = *slot;
        if previous != node {
            self.graph.node(previous).remove_worker();
            self.graph.node(node).add_worker();
            *slot = node;
            trace!(worker = %worker, from = %previous, to = %node, "relocated");
        }
        Some(previous)
    }

    /// Move every placed worker to `node`.
    pub fn move_all_to(&self, node: NodeId) {
        let mut positions = lock(&self.positions);
        for position in positions.values_mut() {
            if *position != node {
                self.graph.node(*position).remove_worker();
                self.graph.node(node).add_worker();
                *position = node;
            }
        }
    }

    /// Forget a worker.  Returns where it was.
    pub fn remove(&self, worker: &WorkerId) -> Option<NodeId> {
        let mut positions = lock(&self.positions);
        let node = positions.remove(worker)?;
        self.graph.node(node).remove_worker();
        Some(node)
    }

    pub fn position(&self, worker: &WorkerId) -> Option<NodeId> {
        lock(&self.positions).get(worker).copied()
    }

    pub fn len(&self) -> usize {
        lock(&self.positions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
