//! Dijkstra reference solution.
//!
//! Used to report how far the colony's best path is from the true optimum.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use aco_core::NodeId;

use crate::{GraphError, GraphResult, Path, PathBuilder, PheromoneGraph};

/// Heap key: distance ordered with `total_cmp`, ties broken by `NodeId`.
#[derive(PartialEq)]
struct Entry(f64, NodeId);

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

/// Shortest path from `from` to `to` by edge distance.
pub fn shortest_path(graph: &PheromoneGraph, from: NodeId, to: NodeId) -> GraphResult<Path> {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![NodeId::INVALID; n];
    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(Reverse(Entry(0.0, from)));

    while let Some(Reverse(Entry(cost, node))) = heap.pop() {
        if node == to {
            break;
        }
        if cost > dist[node.index()] {
            continue;
        }
        for (edge, next) in graph.neighbours(node) {
            let candidate = cost + graph.edge(edge).distance();
            if candidate < dist[next.index()] {
                dist[next.index()] = candidate;
                prev[next.index()] = node;
                heap.push(Reverse(Entry(candidate, next)));
            }
        }
    }

    if dist[to.index()].is_infinite() {
        return Err(GraphError::NoRoute {
            from: graph.node_name(from).to_owned(),
            to:   graph.node_name(to).to_owned(),
        });
    }

    let mut hops = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        hops.push(cur);
    }
    hops.reverse();

    let mut builder = PathBuilder::new(graph, from);
    for &hop in &hops[1..] {
        builder.push(hop)?;
    }
    Ok(builder.seal())
}

/// Length of the shortest path from `from` to `to`.
pub fn shortest_distance(graph: &PheromoneGraph, from: NodeId, to: NodeId) -> GraphResult<f64> {
    shortest_path(graph, from, to).map(|p| p.total_distance())
}
