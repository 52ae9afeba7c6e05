//! `aco-sim` — the colony orchestrator.
//!
//! A [`Colony`] ties together the pheromone graph, the algorithm state
//! machine and the coordination primitives, and exposes the narrow surface
//! an external worker runtime talks to:
//!
//! | Direction | Surface                                                     |
//! |-----------|-------------------------------------------------------------|
//! | inbound   | `arrive`, `depart`, `respond`, `submit(worker, action)`     |
//! | outbound  | [`NoticeSink`] receiving [`Notice`]s once per tick / cycle  |
//! | queries   | cycle, best path, pheromone, worker counts, termination     |
//! | lifecycle | `start`, `run_tick`, `stop`, `wait_finished`                |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the ant-cycle per-edge update on Rayon.           |
//! | `fx-hash`  | FxHash for the worker position map and graph lookups.  |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use aco_core::{ColonyConfig, WorkerId};
//! use aco_sim::{ActionDescriptor, ColonyBuilder};
//!
//! let colony = ColonyBuilder::new(ColonyConfig::default()).build()?;
//! let ant = WorkerId::new("ant-1");
//! colony.arrive(&ant)?;
//! colony.start()?;
//! // ... on each notice:
//! colony.submit(&ant, ActionDescriptor::move_to("Sibiu"))?;
//! ```

pub mod action;
pub mod builder;
pub mod colony;
pub mod error;
pub mod locator;
pub mod notice;
pub mod observer;


pub use action::{Action, ActionArg, ActionDescriptor, CATALOG};
pub use builder::ColonyBuilder;
pub use colony::Colony;
pub use error::{SimError, SimResult};
pub use locator::WorkerLocator;
pub use notice::{NoopSink, Notice, NoticeSink};
pub use observer::{ColonyObserver, CycleReport, NoopObserver, TickReport};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
