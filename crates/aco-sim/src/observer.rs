//! Colony observer trait for progress reporting and data collection.

use aco_algorithm::TerminationReason;
use aco_core::{Cycle, Tick};
use aco_graph::{Path, PheromoneGraph};

/// Summary of one finished tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick:      Tick,
    /// Cycle in progress when the tick began.
    pub cycle:     Cycle,
    /// Workers that answered the "time advanced" notice.
    pub responded: usize,
    pub timed_out: bool,
    /// Actions the barrier ran this tick.
    pub executed:  usize,
    /// Of those, how many failed or panicked.
    pub failed:    usize,
    /// The tick closed a cycle.
    pub new_cycle: bool,
}

/// State at a cycle boundary, after the pheromone policy ran.
pub struct CycleReport<'a> {
    /// The cycle that just closed.
    pub cycle:       Cycle,
    pub tick:        Tick,
    pub graph:       &'a PheromoneGraph,
    pub best:        Option<&'a Path>,
    pub population:  usize,
    pub termination: Option<TerminationReason>,
}

/// Callbacks invoked by the colony's tick procedure.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Callbacks run on the ticking thread
/// with the observer locked; they must not call back into the colony's
/// lifecycle methods.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl ColonyObserver for Progress {
///     fn on_cycle_end(&mut self, report: &CycleReport<'_>) {
///         if let Some(best) = report.best {
///             println!("{}: best {best}", report.cycle);
///         }
///     }
/// }
/// ```
pub trait ColonyObserver: Send {
    /// Called at the very start of each tick, before the response wait.
    fn on_tick_start(&mut self, _tick: Tick) {}

    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called once per cycle boundary.
    fn on_cycle_end(&mut self, _report: &CycleReport<'_>) {}

    /// Called once when the colony finishes, by termination or by `stop`.
    fn on_sim_end(&mut self, _termination: Option<TerminationReason>) {}
}

/// A [`ColonyObserver`] that does nothing.
pub struct NoopObserver;

impl ColonyObserver for NoopObserver {}
