//! `aco-algorithm` — what the colony learns from the paths its workers walk.
//!
//! # Cycle state machine
//!
//! ```text
//! RUNNING ──(cycle ≥ max at a boundary)──────────────▶ TERMINATED(CyclesExhausted)
//!    │
//!    └──(cycle > 1 and every reported path equal)────▶ TERMINATED(Stagnation)
//! ```
//!
//! Within a cycle, workers report edge traversals and completed paths
//! (concurrently, from the action pool).  Once per tick the orchestrator calls
//! [`Algorithm::advance_iteration`]; an iteration in which nobody moved closes
//! the cycle: termination is checked, the [`PheromonePolicy`] runs over the
//! solution paths, and per-cycle bookkeeping resets.
//!
//! | Module          | Contents                                             |
//! |-----------------|------------------------------------------------------|
//! | [`algorithm`]   | `Algorithm`                                          |
//! | [`policy`]      | `PheromonePolicy` trait, `PolicyParams`, `EdgeSolutions` |
//! | [`ant_cycle`]   | `AntCycle` (evaporate, then deposit Q / L)           |
//! | [`greedy`]      | `StochasticGreedy` (no pheromone updates)            |
//! | [`registry`]    | name → policy factory table                          |
//! | [`termination`] | `TerminationReason`                                  |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs `AntCycle`'s per-edge update on Rayon.            |

pub mod algorithm;
pub mod ant_cycle;
pub mod error;
pub mod greedy;
pub mod policy;
pub mod registry;
pub mod termination;

#[cfg(test)]
mod tests;

pub use algorithm::Algorithm;
pub use ant_cycle::AntCycle;
pub use error::{AlgoError, AlgoResult};
pub use greedy::StochasticGreedy;
pub use policy::{EdgeSolutions, PheromonePolicy, PolicyParams};
pub use registry::{ALGORITHMS, policy};
pub use termination::TerminationReason;
