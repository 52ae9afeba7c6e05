//! Paths walked by workers.
//!
//! A path is built by exactly one producer through [`PathBuilder`] and then
//! sealed into an immutable [`Path`].  Sealing computes the hash and the
//! display label once; only sealed paths can be compared, hashed or shared.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use aco_core::{EdgeId, NodeId};

use crate::{GraphError, GraphResult, PheromoneGraph};

/// Fewest edges a reported path may have.
pub const MIN_PATH_EDGES: usize = 2;

// ── PathBuilder ───────────────────────────────────────────────────────────────

/// Append-only path under construction.
pub struct PathBuilder<'g> {
    graph:    &'g PheromoneGraph,
    nodes:    Vec<NodeId>,
    edges:    Vec<EdgeId>,
    distance: f64,
}

impl<'g> PathBuilder<'g> {
    pub fn new(graph: &'g PheromoneGraph, start: NodeId) -> Self {
        Self { graph, nodes: vec![start], edges: Vec::new(), distance: 0.0 }
    }

    /// Extend the path to `next`.  Fails if no edge joins the current end to it.
    pub fn push(&mut self, next: NodeId) -> GraphResult<&mut Self> {
        let last = *self.nodes.last().unwrap_or(&next);
        let edge = self.graph.edge_between(last, next).ok_or_else(|| GraphError::NoEdge {
            from: self.graph.node_name(last).to_owned(),
            to:   self.graph.node_name(next).to_owned(),
        })?;
        self.distance += self.graph.edge(edge).distance();
        self.edges.push(edge);
        self.nodes.push(next);
        Ok(self)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn seal(self) -> Path {
        let mut hasher = PathHasher::default();
        for edge in &self.edges {
            hasher.mix(self.graph.edge(*edge));
        }
        let label = self
            .nodes
            .iter()
            .map(|&n| self.graph.node_name(n))
            .collect::<Vec<_>>()
            .join(", ");
        Path {
            nodes:    self.nodes,
            edges:    self.edges,
            distance: self.distance,
            hash:     hasher.0,
            label,
        }
    }
}

/// Order-sensitive combination of orientation-independent edge hashes.
#[derive(Default)]
struct PathHasher(u64);

impl PathHasher {
    fn mix(&mut self, edge: &crate::Edge) {
        let mut h = std::collections::hash_map::DefaultHasher::new();
        edge.hash(&mut h);
        self.0 = self.0.wrapping_mul(31).wrapping_add(h.finish());
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// A sealed, immutable path.
///
/// Two paths are equal when they visit the same node sequence; the hash is
/// the one computed at sealing.  Paths are ordered by total distance through
/// [`cmp_distance`](Self::cmp_distance), not through `Ord`, since equal
/// distances do not imply equal paths.
#[derive(Clone)]
pub struct Path {
    nodes:    Vec<NodeId>,
    edges:    Vec<EdgeId>,
    distance: f64,
    hash:     u64,
    label:    String,
}

impl Path {
    /// Resolve `names` against `graph` and seal the result.
    ///
    /// Fails with [`GraphError::PathTooShort`] for fewer than
    /// [`MIN_PATH_EDGES`] edges, [`GraphError::UnknownNode`] for an unknown
    /// name, and [`GraphError::NoEdge`] when consecutive nodes are not joined.
    pub fn from_names<S: AsRef<str>>(graph: &PheromoneGraph, names: &[S]) -> GraphResult<Path> {
        let got = names.len().saturating_sub(1);
        if got < MIN_PATH_EDGES {
            return Err(GraphError::PathTooShort { min: MIN_PATH_EDGES, got });
        }
        let ids = names
            .iter()
            .map(|n| graph.require_node(n.as_ref()))
            .collect::<GraphResult<Vec<_>>>()?;

        let mut builder = PathBuilder::new(graph, ids[0]);
        for &id in &ids[1..] {
            builder.push(id)?;
        }
        Ok(builder.seal())
    }

    pub fn total_distance(&self) -> f64 {
        self.distance
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn first_node(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn last_node(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn cmp_distance(&self, other: &Path) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }

    pub fn is_shorter_than(&self, other: &Path) -> bool {
        self.cmp_distance(other) == Ordering::Less
    }

    /// Comma-separated node names, e.g. `"Arad, Sibiu, Fagaras"`.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.nodes.len() == other.nodes.len() && self.nodes == other.nodes
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.distance)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Path")
            .field("label", &self.label)
            .field("distance", &self.distance)
            .finish()
    }
}
