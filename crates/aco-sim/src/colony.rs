//! The `Colony` struct and its tick procedure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, Weak};
use std::time::{Duration, Instant};

use aco_algorithm::{Algorithm, TerminationReason};
use aco_core::{ColonyConfig, Cycle, EdgeId, NodeId, Tick, WorkerId};
use aco_graph::{Path, PheromoneGraph};
use aco_sync::{ActionBarrier, BarrierOutcome, CancelToken, TickClock, WorkerCoordinator};
use tracing::{debug, error, info, warn};

use crate::action::ActionContext;
use crate::{
    Action, ActionDescriptor, ColonyObserver, CycleReport, Notice, NoticeSink, SimError, SimResult,
    TickReport, WorkerLocator, lock,
};

/// One simulation run: graph, algorithm, coordination and worker positions.
///
/// `Colony` is always shared behind an `Arc` (see
/// [`ColonyBuilder::build`][crate::ColonyBuilder::build]).  External worker
/// runtimes call the lifecycle methods ([`arrive`](Self::arrive),
/// [`depart`](Self::depart), [`submit`](Self::submit)) from any thread;
/// ticks are driven either by [`start`](Self::start), which runs them on a
/// [`TickClock`], or by calling [`run_tick`](Self::run_tick) directly.
///
/// # One tick
///
/// ```text
/// ① publish TimeAdvanced(tick) inside the response wait; wait for every
///    live worker (each accepted action counts as its response)
/// ② run every queued action on the barrier pool and wait for all of them
/// ③ Algorithm::advance_iteration
/// ④ on a cycle boundary: move every worker to the start node, then publish
///    NewCycle(cycle) inside a second response wait
/// ⑤ stop if the algorithm terminated or a wait was interrupted
/// ```
pub struct Colony {
    pub(crate) config:      ColonyConfig,
    pub(crate) graph:       Arc<PheromoneGraph>,
    pub(crate) start:       NodeId,
    pub(crate) destination: NodeId,

    pub(crate) algorithm:   Arc<Algorithm>,
    pub(crate) coordinator: WorkerCoordinator,
    pub(crate) locator:     Arc<WorkerLocator>,
    pub(crate) barrier:     ActionBarrier,
    pub(crate) cancel:      CancelToken,

    pub(crate) notices:     Box<dyn NoticeSink>,
    pub(crate) observer:    Mutex<Box<dyn ColonyObserver>>,

    /// Last tick started; 0 before the first.
    pub(crate) tick:        AtomicU64,
    /// Serialises `run_tick` callers.
    pub(crate) ticking:     Mutex<()>,
    pub(crate) clock:       Mutex<Option<TickClock>>,
    pub(crate) finished:    Mutex<bool>,
    pub(crate) finished_cv: Condvar,
}

impl Colony {
    // ── Worker lifecycle ──────────────────────────────────────────────────

    /// A worker joined.  It is placed on the start node and is expected to
    /// respond from the current tick on.
    pub fn arrive(&self, worker: &WorkerId) -> SimResult<()> {
        if !self.locator.place(worker, self.start) {
            return Err(SimError::protocol(worker, "arrived twice"));
        }
        self.coordinator.arrive(worker);
        info!(worker = %worker, population = self.coordinator.population(), "worker joined");
        Ok(())
    }

    /// A worker left.  Its completed paths stay recorded.
    pub fn depart(&self, worker: &WorkerId) -> SimResult<()> {
        if self.locator.remove(worker).is_none() {
            return Err(SimError::protocol(worker, "departed without arriving"));
        }
        self.coordinator.depart(worker);
        self.algorithm.on_worker_removed(worker);
        info!(worker = %worker, population = self.coordinator.population(), "worker left");
        Ok(())
    }

    /// A worker answered the current notice without submitting an action.
    /// Returns whether the response counted.
    pub fn respond(&self, worker: &WorkerId) -> bool {
        self.coordinator.respond(worker)
    }

    /// Validate `descriptor` against the action catalog and queue it for
    /// the next barrier phase.  An accepted action counts as the worker's
    /// response; the returned flag says whether that response counted.
    ///
    /// Unknown workers and ill-formed actions are rejected here with
    /// [`SimError::Protocol`].  Failures while the action runs (unknown
    /// node, no road, malformed path) are logged by the barrier.
    pub fn submit(&self, worker: &WorkerId, descriptor: ActionDescriptor) -> SimResult<bool> {
        if self.locator.position(worker).is_none() {
            return Err(SimError::protocol(worker, format!("submitted {descriptor} while not in the colony")));
        }
        let action = Action::parse(&descriptor).map_err(|reason| SimError::protocol(worker, reason))?;
        debug!(worker = %worker, action = %descriptor, "action queued");

        let context = ActionContext {
            algorithm: Arc::clone(&self.algorithm),
            locator:   Arc::clone(&self.locator),
            start:     self.start,
        };
        let label = format!("{worker}:{}", action.kind());
        let owner = worker.clone();
        self.barrier.submit(label, move || context.execute(&owner, action));
        Ok(self.coordinator.respond(worker))
    }

    // ── Tick procedure ────────────────────────────────────────────────────

    /// Run one tick on the calling thread.  Returns `true` when the colony
    /// should stop ticking.
    pub fn run_tick(&self) -> SimResult<bool> {
        let _turn = lock(&self.ticking);
        if self.is_finished() {
            return Ok(true);
        }

        let tick = Tick(self.tick.fetch_add(1, Ordering::AcqRel) + 1);
        let cycle = self.algorithm.cycle();
        let began = Instant::now();
        lock(&self.observer).on_tick_start(tick);
        debug!(%tick, %cycle, "tick begins");

        // ① responses
        let timeout = self.config.response_timeout;
        let responses = self
            .coordinator
            .wait_for_responses(|| self.notices.publish(Notice::TimeAdvanced(tick)), timeout)?;
        let mut stop = responses.interrupted;

        // ② actions
        let (executed, failed) = match self.barrier.run_and_wait(self.config.action_deadline, &self.cancel) {
            BarrierOutcome::Completed { executed, failed } => (executed, failed),
            BarrierOutcome::Interrupted { outstanding } => {
                warn!(%tick, outstanding, "action barrier interrupted; tick advancement stops");
                stop = true;
                (0, 0)
            }
        };

        // ③ fold
        let new_cycle = !stop && self.algorithm.advance_iteration();

        // ④ cycle boundary
        if new_cycle {
            let began_cycle = Instant::now();
            self.locator.move_all_to(self.start);
            let next = self.algorithm.cycle();
            let report = self
                .coordinator
                .wait_for_responses(|| self.notices.publish(Notice::NewCycle(next)), timeout)?;
            stop |= report.interrupted;
            self.report_cycle(cycle, tick);
            info!(
                closed = %cycle,
                elapsed_ms = began_cycle.elapsed().as_millis() as u64,
                "cycle advance complete"
            );
        }

        // ⑤ termination
        let termination = self.algorithm.termination();
        if let Some(reason) = termination {
            info!(%tick, %reason, "algorithm finished");
            stop = true;
        }

        lock(&self.observer).on_tick_end(&TickReport {
            tick,
            cycle,
            responded: responses.responded(),
            timed_out: responses.timed_out,
            executed,
            failed,
            new_cycle,
        });
        debug!(%tick, elapsed_ms = began.elapsed().as_millis() as u64, "tick complete");

        if stop {
            self.finish(termination);
        }
        Ok(stop)
    }

    fn report_cycle(&self, closed: Cycle, tick: Tick) {
        let best = self.algorithm.best_path().ok();
        lock(&self.observer).on_cycle_end(&CycleReport {
            cycle: closed,
            tick,
            graph: &self.graph,
            best: best.as_deref(),
            population: self.coordinator.population(),
            termination: self.algorithm.termination(),
        });
    }

    /// Mark the run finished and notify the observer, once.
    fn finish(&self, termination: Option<TerminationReason>) {
        {
            let mut finished = lock(&self.finished);
            if *finished {
                return;
            }
            *finished = true;
            self.finished_cv.notify_all();
        }
        lock(&self.observer).on_sim_end(termination);
        match self.algorithm.best_path() {
            Ok(best) => info!(best = %best, ticks = self.tick().0, "colony finished"),
            Err(_) => info!(ticks = self.tick().0, "colony finished without a solution"),
        }
    }

    // ── Run lifecycle ─────────────────────────────────────────────────────

    /// Wait in the background for the initial population to settle, then
    /// start the tick clock.  Returns once the arrival wait is running.
    pub fn start(self: &Arc<Self>) -> SimResult<()> {
        let colony = Arc::downgrade(self);
        self.coordinator.wait_for_initial_arrivals(
            move || {
                let Some(colony) = colony.upgrade() else { return };
                if let Err(e) = colony.start_clock() {
                    error!(error = %e, "could not start the tick clock");
                }
            },
            self.config.arrival_idle_timeout,
        )?;
        Ok(())
    }

    fn start_clock(self: &Arc<Self>) -> SimResult<()> {
        let mut slot = lock(&self.clock);
        if self.cancel.is_cancelled() || self.is_finished() {
            debug!("colony stopped before the clock started");
            return Ok(());
        }
        let colony: Weak<Colony> = Arc::downgrade(self);
        let clock = TickClock::new(self.config.tick_period, move || {
            let Some(colony) = colony.upgrade() else { return true };
            match colony.run_tick() {
                Ok(stop) => stop,
                Err(e) => {
                    error!(error = %e, "tick failed; continuing");
                    false
                }
            }
        });
        clock.start()?;
        *slot = Some(clock);
        Ok(())
    }

    /// Change the clock period.  Takes effect from the next tick.
    pub fn set_tick_period(&self, period: Duration) {
        if let Some(clock) = lock(&self.clock).as_ref() {
            clock.set_period(period);
        }
    }

    /// Cancel every wait, stop the clock and finish the run.
    pub fn stop(&self) {
        self.cancel.cancel();
        let clock = lock(&self.clock).take();
        if let Some(clock) = clock {
            clock.stop();
        }
        self.finish(self.algorithm.termination());
    }

    /// Block up to `timeout` for the run to finish.  Returns `true` if it has.
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut finished = lock(&self.finished);
        while !*finished {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            finished = self
                .finished_cv
                .wait_timeout(finished, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    pub fn is_finished(&self) -> bool {
        *lock(&self.finished)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<PheromoneGraph> {
        &self.graph
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn cycle(&self) -> Cycle {
        self.algorithm.cycle()
    }

    pub fn max_cycles(&self) -> u32 {
        self.algorithm.max_cycles()
    }

    /// Last tick started ([`Tick::ZERO`] before the first).
    pub fn tick(&self) -> Tick {
        Tick(self.tick.load(Ordering::Acquire))
    }

    pub fn best_path(&self) -> SimResult<Arc<Path>> {
        Ok(self.algorithm.best_path()?)
    }

    /// `None` for an edge id outside the graph.
    pub fn pheromone(&self, edge: EdgeId) -> Option<f64> {
        self.graph.pheromone(edge)
    }

    pub fn worker_count(&self, node: NodeId) -> Option<u32> {
        self.graph.worker_count(node)
    }

    /// `None` while the algorithm is running.
    pub fn termination(&self) -> Option<TerminationReason> {
        self.algorithm.termination()
    }

    pub fn population(&self) -> usize {
        self.coordinator.population()
    }

    pub fn start_node(&self) -> NodeId {
        self.start
    }

    pub fn destination_node(&self) -> NodeId {
        self.destination
    }

    pub fn position(&self, worker: &WorkerId) -> Option<NodeId> {
        self.locator.position(worker)
    }
}
