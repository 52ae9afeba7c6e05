//! `aco-graph` — the undirected, weighted graph ants walk on.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`graph`]      | `PheromoneGraph` (CSR adjacency + atomic pheromone), `GraphBuilder`, `Node`, `Edge` |
//! | [`path`]       | `PathBuilder` (append-only) and sealed `Path`              |
//! | [`topologies`] | Built-in named maps (`romania`, `diamond`)                 |
//! | [`shortest`]   | Dijkstra reference distance                                |
//! | [`error`]      | `GraphError`, `GraphResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | FxHash for the name and node-pair lookup tables.           |
//! | `serde`   | Propagates serde derives to `aco-core` ids.                |

pub mod error;
pub mod graph;
pub mod path;
pub mod shortest;
pub mod topologies;


pub use error::{GraphError, GraphResult};
pub use graph::{Edge, GraphBuilder, INITIAL_PHEROMONE, Node, PheromoneGraph};
pub use path::{Path, PathBuilder};
pub use shortest::{shortest_distance, shortest_path};
pub use topologies::{TOPOLOGIES, topology};
