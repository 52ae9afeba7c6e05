//! The `Algorithm` state machine.

use std::collections::HashSet;
use std::mem;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use aco_core::{Cycle, EdgeId, NodeId, WorkerId};
use aco_graph::{Path, PheromoneGraph};
use tracing::{debug, info};

use crate::{AlgoError, AlgoResult, EdgeSolutions, PheromonePolicy, TerminationReason};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What happened during the current cycle.
#[derive(Default)]
struct CycleBook {
    /// Workers whose completion already counted this cycle.
    completed: HashSet<WorkerId>,
    /// First completion of each worker, in report order.
    reported:  Vec<Arc<Path>>,
    /// Reported paths that reached the destination, by edge.
    solutions: EdgeSolutions,
}

/// Shared algorithm state for one colony.
///
/// Worker hooks (`on_traversal`, `on_path_completed`, `on_worker_removed`)
/// may be called from many threads at once; `advance_iteration` is called by
/// the tick thread after all of a tick's actions have finished.
pub struct Algorithm {
    graph:       Arc<PheromoneGraph>,
    policy:      Box<dyn PheromonePolicy>,
    destination: NodeId,
    max_cycles:  u32,

    cycle:       AtomicU32,
    termination: OnceLock<TerminationReason>,

    moved: Mutex<HashSet<WorkerId>>,
    book:  Mutex<CycleBook>,
    best:  Mutex<Option<Arc<Path>>>,
}

impl Algorithm {
    pub fn new(
        graph:       Arc<PheromoneGraph>,
        policy:      Box<dyn PheromonePolicy>,
        destination: NodeId,
        max_cycles:  u32,
    ) -> AlgoResult<Self> {
        if max_cycles == 0 {
            return Err(AlgoError::Config("max_cycles must be at least 1".into()));
        }
        if destination.index() >= graph.node_count() {
            return Err(AlgoError::Config(format!("destination {destination} is not in the graph")));
        }
        info!(
            algorithm = policy.name(),
            destination = graph.node_name(destination),
            max_cycles,
            "algorithm ready"
        );
        Ok(Self {
            graph,
            policy,
            destination,
            max_cycles,
            cycle: AtomicU32::new(Cycle::FIRST.0),
            termination: OnceLock::new(),
            moved: Mutex::new(HashSet::new()),
            book: Mutex::new(CycleBook::default()),
            best: Mutex::new(None),
        })
    }

    // ── Worker hooks ──────────────────────────────────────────────────────

    /// `worker` walked `edge` during the current iteration.
    pub fn on_traversal(&self, worker: &WorkerId, edge: EdgeId) -> AlgoResult<()> {
        if edge.index() >= self.graph.edge_count() {
            return Err(AlgoError::UnknownEdge(edge));
        }
        lock(&self.moved).insert(worker.clone());
        self.policy.on_traversal(&self.graph, edge);
        Ok(())
    }

    /// `worker` finished a tour along `nodes` (node names, start first).
    ///
    /// Only the first completion per worker per cycle counts; returns whether
    /// this one did.  A counted path that ends at the destination becomes a
    /// solution and replaces the best path if strictly shorter.
    pub fn on_path_completed<S: AsRef<str>>(&self, worker: &WorkerId, nodes: &[S]) -> AlgoResult<bool> {
        let path = Arc::new(Path::from_names(&self.graph, nodes)?);
        let is_solution = path.last_node() == self.destination;

        {
            let mut book = lock(&self.book);
            if !book.completed.insert(worker.clone()) {
                debug!(worker = %worker, "repeat completion this cycle ignored");
                return Ok(false);
            }
            book.reported.push(Arc::clone(&path));
            if is_solution {
                for &edge in path.edges() {
                    book.solutions.entry(edge).or_default().push(Arc::clone(&path));
                }
            }
        }

        if is_solution {
            let mut best = lock(&self.best);
            let improves = best.as_ref().is_none_or(|b| path.is_shorter_than(b));
            if improves {
                info!(worker = %worker, path = %path.label(), distance = path.total_distance(), "new best path");
                *best = Some(path);
            }
        }
        Ok(true)
    }

    /// `worker` left the colony.
    pub fn on_worker_removed(&self, worker: &WorkerId) {
        lock(&self.moved).remove(worker);
    }

    // ── Tick folding ──────────────────────────────────────────────────────

    /// Close the current iteration.  Returns `true` if it was a cycle
    /// boundary (no worker moved since the previous call).
    pub fn advance_iteration(&self) -> bool {
        let boundary = {
            let mut moved = lock(&self.moved);
            let boundary = moved.is_empty();
            moved.clear();
            boundary
        };
        if !boundary {
            return false;
        }

        let book = mem::take(&mut *lock(&self.book));
        let cycle = Cycle(self.cycle.load(Ordering::Acquire));

        if self.termination.get().is_none() {
            if cycle.0 >= self.max_cycles {
                self.terminate(TerminationReason::CyclesExhausted, cycle);
            } else if is_stagnant(cycle, &book.reported) {
                self.terminate(TerminationReason::Stagnation, cycle);
            }
        }

        self.policy.end_of_cycle(&self.graph, &book.solutions);

        let next = cycle.next();
        self.cycle.store(next.0, Ordering::Release);
        info!(
            closed = cycle.0,
            reported = book.reported.len(),
            solutions = book.reported.iter().filter(|p| p.last_node() == self.destination).count(),
            best = self.best_distance(),
            "cycle closed"
        );
        true
    }

    fn terminate(&self, reason: TerminationReason, cycle: Cycle) {
        if self.termination.set(reason).is_ok() {
            info!(cycle = cycle.0, %reason, "algorithm terminated");
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn cycle(&self) -> Cycle {
        Cycle(self.cycle.load(Ordering::Acquire))
    }

    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn graph(&self) -> &Arc<PheromoneGraph> {
        &self.graph
    }

    /// `None` while running.
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination.get().copied()
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.get().is_some()
    }

    /// Shortest solution found so far.
    pub fn best_path(&self) -> AlgoResult<Arc<Path>> {
        lock(&self.best).clone().ok_or(AlgoError::NotFound)
    }

    /// Length of the best path, or `None` before the first solution.
    pub fn best_distance(&self) -> Option<f64> {
        lock(&self.best).as_ref().map(|p| p.total_distance())
    }
}

/// Stagnation: from the second cycle on, at least two workers reported and
/// every report equals the first.
fn is_stagnant(cycle: Cycle, reported: &[Arc<Path>]) -> bool {
    if cycle.is_first() || reported.len() < 2 {
        return false;
    }
    let first = &reported[0];
    reported[1..].iter().all(|p| p == first)
}
