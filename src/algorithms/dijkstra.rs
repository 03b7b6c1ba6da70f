use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::trace;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::RouterId;
use crate::error::RoutingError;
use crate::network::TopoGraph;

/// Total administrative distance along a path.
pub type Cost = u64;

const INFINITY: Cost = Cost::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestPath {
    pub cost: Cost,
    /// Routers from source to destination, both included.
    pub path: Vec<RouterId>,
}

/// Frontier entry. Equal costs pop in insertion order.
#[derive(Debug, PartialEq, Eq)]
struct State {
    cost: Cost,
    seq: u64,
    router: NodeIndex,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct Frontier {
    heap: BinaryHeap<State>,
    seq: u64,
}

impl Frontier {
    fn push(&mut self, cost: Cost, router: NodeIndex) {
        self.heap.push(State { cost, seq: self.seq, router });
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<State> {
        self.heap.pop()
    }
}

/// Minimum-cost path from `source` to `destination`.
///
/// Returns `Ok(None)` when the destination cannot be reached. A query where
/// both ends are the same router yields the single-router path at cost 0.
/// Every router starts in the frontier; entries made stale by a later
/// relaxation are skipped when popped.
pub fn shortest_path(
    graph: &TopoGraph,
    source: &str,
    destination: &str,
) -> Result<Option<ShortestPath>, RoutingError> {
    let source = graph.node(source)?;
    let destination = graph.node(destination)?;

    let mut distances: HashMap<NodeIndex, Cost> = HashMap::with_capacity(graph.vertex_count());
    let mut previous: HashMap<NodeIndex, Option<NodeIndex>> = HashMap::with_capacity(graph.vertex_count());
    let mut frontier = Frontier::default();

    // Initialize distances
    for router in graph.nodes() {
        if router != source {
            distances.insert(router, INFINITY);
            frontier.push(INFINITY, router);
        }
    }
    distances.insert(source, 0);
    previous.insert(source, None);
    frontier.push(0, source);

    while let Some(State { cost, router, .. }) = frontier.pop() {
        // Skip if we've already found a better path
        if cost > distances[&router] {
            continue;
        }

        if router == destination {
            return Ok(match previous.get(&router) {
                Some(_) => Some(ShortestPath {
                    cost,
                    path: reconstruct_path(graph, &previous, router),
                }),
                None => None,
            });
        }

        if cost == INFINITY {
            continue;
        }

        for (neighbor, weight) in graph.links(router) {
            let known = distances[&neighbor];
            let alt = cost.saturating_add(Cost::from(weight));

            if alt < known {
                trace!(
                    "relax {} -> {}: {} (was {})",
                    graph.router(router),
                    graph.router(neighbor),
                    alt,
                    known
                );
                distances.insert(neighbor, alt);
                previous.insert(neighbor, Some(router));
                frontier.push(alt, neighbor);
            }
        }
    }

    Ok(None)
}

fn reconstruct_path(
    graph: &TopoGraph,
    previous: &HashMap<NodeIndex, Option<NodeIndex>>,
    dest: NodeIndex,
) -> Vec<RouterId> {
    let mut path = Vec::new();
    let mut current = Some(dest);

    while let Some(router) = current {
        path.push(graph.router(router).clone());
        current = previous.get(&router).copied().flatten();
    }

    path.reverse();
    path
}
