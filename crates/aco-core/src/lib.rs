//! `aco-core` — foundational types for the ant colony simulation.
//!
//! Every other `aco-*` crate depends on this one.  It has no `aco-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `WorkerId`                           |
//! | [`time`]        | `Tick`, `Cycle`                                          |
//! | [`rng`]         | `WorkerRng` (per-worker)                                 |
//! | [`sampler`]     | `CategoricalSampler` (Vose alias method)                 |
//! | [`config`]      | `ColonyConfig`, the `PARAMETERS` table                   |
//! | [`error`]       | `AcoError`, `AcoResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, counters, config.   |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod sampler;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ColonyConfig, Parameter, PARAMETERS};
pub use error::{AcoError, AcoResult};
pub use ids::{EdgeId, NodeId, WorkerId};
pub use rng::WorkerRng;
pub use sampler::CategoricalSampler;
pub use time::{Cycle, Tick};
