//! Built-in topologies, selectable by name.
//!
//! | Name      | Nodes | Edges | Notes                                        |
//! |-----------|-------|-------|----------------------------------------------|
//! | `romania` | 20    | 23    | The classic Romania road map (km)            |
//! | `diamond` | 4     | 4     | A–B–C–D chain (1 each) plus a direct A–D (5) |

use crate::{GraphBuilder, GraphError, GraphResult, PheromoneGraph};

/// Registered topology factories.
pub const TOPOLOGIES: &[(&str, fn() -> GraphResult<PheromoneGraph>)] = &[
    ("romania", romania),
    ("diamond", diamond),
];

/// Build the topology registered as `name`.
pub fn topology(name: &str) -> GraphResult<PheromoneGraph> {
    TOPOLOGIES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, build)| build())
        .unwrap_or_else(|| Err(GraphError::UnknownTopology(name.to_owned())))
}

fn from_tables(name: &str, nodes: &[&str], roads: &[(&str, &str, f64)]) -> GraphResult<PheromoneGraph> {
    let mut b = GraphBuilder::with_capacity(name, nodes.len(), roads.len());
    for node in nodes {
        b.add_node(*node)?;
    }
    for &(from, to, km) in roads {
        b.add_road(from, to, km)?;
    }
    Ok(b.build())
}

// ── romania ───────────────────────────────────────────────────────────────────

const ROMANIA_NODES: &[&str] = &[
    "Arad", "Bucharest", "Craiova", "Dobreta", "Eforie", "Fagaras", "Giurgiu",
    "Hirsova", "Iasi", "Lugoj", "Mehadia", "Neamt", "Oradea", "Pitesti",
    "Rimnicu Vilcea", "Sibiu", "Timisoara", "Urziceni", "Vaslui", "Zerind",
];

const ROMANIA_ROADS: &[(&str, &str, f64)] = &[
    ("Oradea",         "Zerind",         71.0),
    ("Oradea",         "Sibiu",          151.0),
    ("Zerind",         "Arad",           75.0),
    ("Arad",           "Timisoara",      118.0),
    ("Arad",           "Sibiu",          140.0),
    ("Timisoara",      "Lugoj",          111.0),
    ("Lugoj",          "Mehadia",        70.0),
    ("Mehadia",        "Dobreta",        75.0),
    ("Sibiu",          "Fagaras",        99.0),
    ("Sibiu",          "Rimnicu Vilcea", 80.0),
    ("Rimnicu Vilcea", "Pitesti",        97.0),
    ("Rimnicu Vilcea", "Craiova",        146.0),
    ("Craiova",        "Dobreta",        120.0),
    ("Fagaras",        "Bucharest",      211.0),
    ("Pitesti",        "Craiova",        138.0),
    ("Pitesti",        "Bucharest",      101.0),
    ("Bucharest",      "Giurgiu",        90.0),
    ("Bucharest",      "Urziceni",       85.0),
    ("Urziceni",       "Hirsova",        98.0),
    ("Hirsova",        "Eforie",         86.0),
    ("Urziceni",       "Vaslui",         142.0),
    ("Vaslui",         "Iasi",           92.0),
    ("Iasi",           "Neamt",          87.0),
];

/// The 20-city Romania road map.  Shortest Arad → Bucharest is 418 km
/// (via Sibiu, Rimnicu Vilcea, Pitesti).
pub fn romania() -> GraphResult<PheromoneGraph> {
    from_tables("romania", ROMANIA_NODES, ROMANIA_ROADS)
}

// ── diamond ───────────────────────────────────────────────────────────────────

pub fn diamond() -> GraphResult<PheromoneGraph> {
    from_tables(
        "diamond",
        &["A", "B", "C", "D"],
        &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0), ("A", "D", 5.0)],
    )
}
