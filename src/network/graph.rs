use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::RouterId;
use crate::error::RoutingError;

/// Administrative distance carried by a directed link.
pub type Weight = u32;

/// Directed, weighted graph keyed by router identifier.
///
/// Vertices and each vertex's links are reported in insertion order so that
/// tie-breaking in path searches is reproducible.
#[derive(Debug, Clone, Default)]
pub struct TopoGraph {
    graph: DiGraph<RouterId, Weight>,
    index: HashMap<RouterId, NodeIndex>,
}

impl TopoGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` with no neighbors. A vertex that already exists is left untouched.
    pub fn add_vertex(&mut self, id: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(id) {
            return node;
        }
        let node = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), node);
        node
    }

    /// Adds the directed edge `from -> to`. Both ends must already be vertices.
    ///
    /// Edges are keyed by destination: adding `from -> to` again replaces the
    /// weight instead of creating a parallel edge.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: Weight) -> Result<(), RoutingError> {
        let a = self.node(from)?;
        let b = self.node(to)?;
        self.graph.update_edge(a, b, weight);
        Ok(())
    }

    pub(crate) fn node(&self, id: &str) -> Result<NodeIndex, RoutingError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| RoutingError::UnknownVertex(id.to_string()))
    }

    pub(crate) fn router(&self, node: NodeIndex) -> &RouterId {
        &self.graph[node]
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Outgoing links of `node` in the order they were first added.
    pub(crate) fn links(&self, node: NodeIndex) -> Vec<(NodeIndex, Weight)> {
        // petgraph walks a node's edges newest first
        let mut edges: Vec<_> = self.graph.edges(node).collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| (e.target(), *e.weight())).collect()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &RouterId> {
        self.graph.node_weights()
    }

    pub fn neighbors(&self, id: &str) -> Result<Vec<(&RouterId, Weight)>, RoutingError> {
        let node = self.node(id)?;
        Ok(self
            .links(node)
            .into_iter()
            .map(|(nbr, w)| (self.router(nbr), w))
            .collect())
    }

    /// All edges as `(from, to, weight)`, grouped by source vertex.
    pub fn edges(&self) -> impl Iterator<Item = (&RouterId, &RouterId, Weight)> {
        self.nodes().flat_map(move |from| {
            self.links(from)
                .into_iter()
                .map(move |(to, w)| (self.router(from), self.router(to), w))
        })
    }

    pub fn weight(&self, from: &str, to: &str) -> Option<Weight> {
        let edge = self.graph.find_edge(self.node(from).ok()?, self.node(to).ok()?)?;
        self.graph.edge_weight(edge).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl fmt::Display for TopoGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            writeln!(f, "vertex {}: {}", node.index(), self.router(node))?;
            for (nbr, w) in self.links(node) {
                writeln!(f, " --> neighbor: {} (ad {w})", self.router(nbr))?;
            }
        }
        Ok(())
    }
}
