//! Pheromone graph representation and builder.
//!
//! # Data layout
//!
//! Nodes and edges live in dense `Vec`s indexed by `NodeId` / `EdgeId`.  Each
//! undirected edge is stored once; adjacency is a **Compressed Sparse Row**
//! table of half-edges, so the neighbours of `n` occupy
//!
//! ```text
//! half_edges[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! and both half-edges of a road point at the same `EdgeId`.
//!
//! # Concurrency
//!
//! The topology is immutable after [`GraphBuilder::build`].  The two mutable
//! quantities are atomics: each node's worker count and each edge's
//! pheromone level (an `f64` stored as bits and updated by a compare-and-swap
//! loop), so a shared `&PheromoneGraph` can be updated from any thread.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use aco_core::{EdgeId, NodeId};

use crate::{GraphError, GraphResult};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

/// Pheromone level every edge starts with: the smallest positive normal
/// `f64`, so levels are never exactly zero before the first deposit.
pub const INITIAL_PHEROMONE: f64 = f64::MIN_POSITIVE;

// ── Node ──────────────────────────────────────────────────────────────────────

/// A named location plus the number of workers currently standing on it.
#[derive(Debug)]
pub struct Node {
    name:    String,
    workers: AtomicU32,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), workers: AtomicU32::new(0) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn worker_count(&self) -> u32 {
        self.workers.load(Ordering::Acquire)
    }

    pub fn add_worker(&self) {
        self.workers.fetch_add(1, Ordering::AcqRel);
    }

    /// Decrement the worker count.  Never goes below zero.
    pub fn remove_worker(&self) {
        let _ = self
            .workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// An undirected road between two nodes.
///
/// Equality and hashing ignore orientation: `Edge::new(a, b, d)` equals
/// `Edge::new(b, a, d)`.
pub struct Edge {
    a:         NodeId,
    b:         NodeId,
    distance:  f64,
    pheromone: AtomicU64,
}

impl Edge {
    pub fn new(a: NodeId, b: NodeId, distance: f64) -> Self {
        Self::with_pheromone(a, b, distance, INITIAL_PHEROMONE)
    }

    pub fn with_pheromone(a: NodeId, b: NodeId, distance: f64, pheromone: f64) -> Self {
        Self { a, b, distance, pheromone: AtomicU64::new(pheromone.to_bits()) }
    }

    /// The two endpoints in insertion order.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    /// The endpoint that is not `node`, or `None` if `node` is not on this edge.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn pheromone(&self) -> f64 {
        f64::from_bits(self.pheromone.load(Ordering::Acquire))
    }

    /// Atomically replace the pheromone level with `f(old)`; returns the new level.
    ///
    /// `f` may run more than once under contention, so it must be pure.
    pub fn update_pheromone(&self, f: impl Fn(f64) -> f64) -> f64 {
        let mut current = self.pheromone.load(Ordering::Acquire);
        loop {
            let next = f(f64::from_bits(current));
            match self.pheromone.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    fn key(&self) -> (NodeId, NodeId) {
        if self.a <= self.b { (self.a, self.b) } else { (self.b, self.a) }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("distance", &self.distance)
            .field("pheromone", &self.pheromone())
            .finish()
    }
}

// ── PheromoneGraph ────────────────────────────────────────────────────────────

/// Undirected weighted graph with per-edge pheromone.
///
/// Do not construct directly; use [`GraphBuilder`] or a registered
/// [`topology`](crate::topology).
pub struct PheromoneGraph {
    name:  String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,

    /// CSR row pointer into `half_edges`.  Length = `node_count + 1`.
    node_out_start: Vec<u32>,
    /// `(edge, neighbour)` sorted by source node.
    half_edges:     Vec<(EdgeId, NodeId)>,

    by_name: Map<String, NodeId>,
    by_pair: Map<(NodeId, NodeId), EdgeId>,
}

impl PheromoneGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(|i| EdgeId(i as u32))
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        self.nodes[id.index()].name()
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Like [`node_id`](Self::node_id) but fails with [`GraphError::UnknownNode`].
    pub fn require_node(&self, name: &str) -> GraphResult<NodeId> {
        self.node_id(name).ok_or_else(|| GraphError::UnknownNode(name.to_owned()))
    }

    /// The edge joining `a` and `b`, in either orientation.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.by_pair.get(&ordered(a, b)).copied()
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// `(edge, neighbour)` pairs adjacent to `node`.  No allocation.
    #[inline]
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        self.half_edges[start..end].iter().copied()
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Mutable state ─────────────────────────────────────────────────────

    /// `None` for an edge id outside this graph.
    pub fn pheromone(&self, edge: EdgeId) -> Option<f64> {
        self.edges.get(edge.index()).map(Edge::pheromone)
    }

    /// See [`Edge::update_pheromone`].
    pub fn update_pheromone(&self, edge: EdgeId, f: impl Fn(f64) -> f64) -> f64 {
        self.edges[edge.index()].update_pheromone(f)
    }

    pub fn worker_count(&self, node: NodeId) -> Option<u32> {
        self.nodes.get(node.index()).map(Node::worker_count)
    }
}

impl fmt::Debug for PheromoneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PheromoneGraph")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}

fn ordered(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`PheromoneGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use aco_graph::GraphBuilder;
///
/// let mut b = GraphBuilder::new("pair");
/// let x = b.add_node("X").unwrap();
/// let y = b.add_node("Y").unwrap();
/// b.add_edge(x, y, 12.0).unwrap();
/// let graph = b.build();
/// assert_eq!(graph.edge_between(y, x), graph.edge_between(x, y));
/// ```
pub struct GraphBuilder {
    name:      String,
    nodes:     Vec<Node>,
    edges:     Vec<Edge>,
    by_name:   Map<String, NodeId>,
    by_pair:   Map<(NodeId, NodeId), EdgeId>,
    pheromone: f64,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, 0, 0)
    }

    pub fn with_capacity(name: impl Into<String>, nodes: usize, edges: usize) -> Self {
        let mut by_name = Map::default();
        by_name.reserve(nodes);
        let mut by_pair = Map::default();
        by_pair.reserve(edges);
        Self {
            name: name.into(),
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
            by_name,
            by_pair,
            pheromone: INITIAL_PHEROMONE,
        }
    }

    /// Seed pheromone for edges added after this call.
    pub fn initial_pheromone(mut self, level: f64) -> Self {
        self.pheromone = level;
        self
    }

    /// Add a named node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, name: impl Into<String>) -> GraphResult<NodeId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateNode(name));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.nodes.push(Node::new(name));
        Ok(id)
    }

    /// Add an undirected edge.  Distances must be finite and non-negative;
    /// at most one edge may join any pair of nodes.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, distance: f64) -> GraphResult<EdgeId> {
        for n in [a, b] {
            if n.index() >= self.nodes.len() {
                return Err(GraphError::UnknownNode(n.to_string()));
            }
        }
        let name = |n: NodeId| self.nodes[n.index()].name().to_owned();
        if !distance.is_finite() || distance < 0.0 {
            return Err(GraphError::InvalidDistance { from: name(a), to: name(b), distance });
        }
        let key = ordered(a, b);
        if self.by_pair.contains_key(&key) {
            return Err(GraphError::DuplicateEdge(name(a), name(b)));
        }
        let id = EdgeId(self.edges.len() as u32);
        self.by_pair.insert(key, id);
        self.edges.push(Edge::with_pheromone(a, b, distance, self.pheromone));
        Ok(id)
    }

    /// Convenience: add an edge between two nodes by name.
    pub fn add_road(&mut self, a: &str, b: &str, distance: f64) -> GraphResult<EdgeId> {
        let lookup = |n: &str| {
            self.by_name.get(n).copied().ok_or_else(|| GraphError::UnknownNode(n.to_owned()))
        };
        let (a, b) = (lookup(a)?, lookup(b)?);
        self.add_edge(a, b, distance)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Consume the builder and produce the graph.  O(E log E).
    pub fn build(self) -> PheromoneGraph {
        let node_count = self.nodes.len();

        let mut half: Vec<(NodeId, EdgeId, NodeId)> = Vec::with_capacity(self.edges.len() * 2);
        for (i, edge) in self.edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            half.push((edge.a, id, edge.b));
            if edge.a != edge.b {
                half.push((edge.b, id, edge.a));
            }
        }
        half.sort_unstable_by_key(|&(from, id, _)| (from, id));

        let mut node_out_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &half {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        PheromoneGraph {
            name: self.name,
            nodes: self.nodes,
            edges: self.edges,
            node_out_start,
            half_edges: half.into_iter().map(|(_, id, to)| (id, to)).collect(),
            by_name: self.by_name,
            by_pair: self.by_pair,
        }
    }
}
