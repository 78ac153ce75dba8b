//! `Graph`: a typed directed graph of mesh nodes and attributed edges.
//!
//! Nodes live in an ordered map keyed by [`NodeId`] so iteration (and every
//! export derived from it) is deterministic. Edges are kept in insertion
//! order. The only structural invariant is that every edge endpoint is a node
//! of the graph; all mutating helpers enforce it.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshGraphError;
use crate::topology::edge::{EdgeKind, MeshEdge};
use crate::topology::node::{MeshNode, NodeId};

/// Directed graph of [`MeshNode`]s and [`MeshEdge`]s.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<NodeId, MeshNode>,
    edges: Vec<MeshEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph holding `nodes` and no edges. Duplicate ids are rejected.
    pub fn from_nodes(nodes: impl IntoIterator<Item = MeshNode>) -> Result<Self, MeshGraphError> {
        let mut g = Self::new();
        for n in nodes {
            g.add_node(n)?;
        }
        Ok(g)
    }

    /// Graph from explicit parts, validated.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = MeshNode>,
        edges: impl IntoIterator<Item = MeshEdge>,
    ) -> Result<Self, MeshGraphError> {
        let mut g = Self::from_nodes(nodes)?;
        for e in edges {
            g.add_edge(e)?;
        }
        Ok(g)
    }

    /// Insert a node; its id must be new.
    pub fn add_node(&mut self, node: MeshNode) -> Result<(), MeshGraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(MeshGraphError::InvalidGraph(format!(
                "duplicate node id {}",
                node.id
            )));
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Append an edge whose endpoints must already exist.
    pub fn add_edge(&mut self, edge: MeshEdge) -> Result<(), MeshGraphError> {
        for id in [edge.source, edge.target] {
            if !self.nodes.contains_key(&id) {
                return Err(MeshGraphError::InvalidGraph(format!(
                    "edge {} -> {} references missing node {id}",
                    edge.source, edge.target
                )));
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Add the edge `source -> target`, deriving its attributes from node positions.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: EdgeKind,
    ) -> Result<(), MeshGraphError> {
        let edge = match (self.nodes.get(&source), self.nodes.get(&target)) {
            (Some(s), Some(t)) => MeshEdge::between(s, t, kind),
            _ => {
                return Err(MeshGraphError::InvalidGraph(format!(
                    "cannot connect {source} -> {target}: endpoint missing"
                )));
            }
        };
        self.edges.push(edge);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&MeshNode> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &MeshNode> + '_ {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn edges(&self) -> &[MeshEdge] {
        &self.edges
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Same graph without edges.
    pub fn without_edges(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            edges: Vec::new(),
        }
    }

    /// Whether node ids are exactly `0..num_nodes`.
    pub fn has_contiguous_ids(&self) -> bool {
        self.nodes.keys().enumerate().all(|(i, id)| id.get() == i)
    }

    /// Length of the longest edge, if any.
    pub fn longest_edge(&self) -> Option<f64> {
        self.edges.iter().map(|e| e.length).max_by(f64::total_cmp)
    }

    /// Copy with every node id shifted by `offset`.
    pub fn offset_ids(&self, offset: usize) -> Self {
        self.map_ids(|id| id.offset(offset))
    }

    /// Copy with node ids remapped through an injective `f`.
    pub(crate) fn map_ids(&self, mut f: impl FnMut(NodeId) -> NodeId) -> Self {
        let nodes = self
            .nodes
            .values()
            .map(|n| {
                let id = f(n.id);
                (id, n.with_id(id))
            })
            .collect();
        let edges = self.edges.iter().map(|e| e.map_ids(&mut f)).collect();
        Self { nodes, edges }
    }

    /// Relabel nodes to `0..n` in ascending id order.
    ///
    /// Returns the relabelled graph and the old id of every new id.
    pub fn relabel_contiguous(&self) -> (Self, Vec<NodeId>) {
        let old_ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let new_of: BTreeMap<NodeId, NodeId> = old_ids
            .iter()
            .enumerate()
            .map(|(i, &old)| (old, NodeId::new(i)))
            .collect();
        let g = self.map_ids(|id| new_of[&id]);
        (g, old_ids)
    }

    /// Union of several graphs.
    ///
    /// Nodes present in more than one input must be identical; edges are
    /// concatenated in input order.
    pub fn union<'a>(graphs: impl IntoIterator<Item = &'a Graph>) -> Result<Self, MeshGraphError> {
        let mut out = Self::new();
        for g in graphs {
            for n in g.nodes() {
                match out.nodes.get(&n.id) {
                    Some(existing) if existing != n => {
                        return Err(MeshGraphError::InvalidGraph(format!(
                            "node {} differs between merged graphs",
                            n.id
                        )));
                    }
                    Some(_) => {}
                    None => {
                        out.nodes.insert(n.id, *n);
                    }
                }
            }
            out.edges.extend_from_slice(&g.edges);
        }
        Ok(out)
    }

    /// Drop repeated `(source, target, kind)` edges, keeping the first.
    pub fn dedup_edges(&mut self) {
        let edges = std::mem::take(&mut self.edges);
        self.edges = edges
            .into_iter()
            .unique_by(|e| (e.source, e.target, e.kind))
            .collect();
    }

    /// Split into one subgraph per key, each holding the edges with that key
    /// and the nodes they touch.
    pub fn split_by_edge<K: Ord>(&self, mut key: impl FnMut(&MeshEdge) -> K) -> BTreeMap<K, Graph> {
        let mut out: BTreeMap<K, Graph> = BTreeMap::new();
        for e in &self.edges {
            let part = out.entry(key(e)).or_default();
            for id in [e.source, e.target] {
                part.nodes.entry(id).or_insert(self.nodes[&id]);
            }
            part.edges.push(*e);
        }
        out
    }

    /// Node positions lifted to 3D with `z = level * z_spacing`, in id order.
    pub fn layered_positions(&self, z_spacing: f64) -> Vec<(NodeId, [f64; 3])> {
        self.nodes
            .values()
            .map(|n| (n.id, [n.pos.x(), n.pos.y(), n.level as f64 * z_spacing]))
            .collect()
    }
}

impl DebugInvariants for Graph {
    fn validate_invariants(&self) -> Result<(), MeshGraphError> {
        for (id, n) in &self.nodes {
            if *id != n.id {
                return Err(MeshGraphError::InvalidGraph(format!(
                    "node keyed {id} carries id {}",
                    n.id
                )));
            }
        }
        for e in &self.edges {
            for id in [e.source, e.target] {
                if !self.nodes.contains_key(&id) {
                    return Err(MeshGraphError::InvalidGraph(format!(
                        "edge {} -> {} references missing node {id}",
                        e.source, e.target
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn node(id: usize, x: f64, y: f64, level: usize) -> MeshNode {
        MeshNode::mesh(NodeId::new(id), Point::new(x, y), level)
    }

    fn triangle() -> Graph {
        let mut g =
            Graph::from_nodes([node(0, 0.0, 0.0, 0), node(1, 1.0, 0.0, 0), node(2, 0.0, 1.0, 1)])
                .unwrap();
        g.connect(NodeId::new(0), NodeId::new(1), EdgeKind::Mesh { level: 0 }).unwrap();
        g.connect(NodeId::new(1), NodeId::new(0), EdgeKind::Mesh { level: 0 }).unwrap();
        g.connect(NodeId::new(0), NodeId::new(2), EdgeKind::Up { from: 0, to: 1 }).unwrap();
        g
    }

    #[test]
    fn edges_must_reference_existing_nodes() {
        let mut g = triangle();
        let err = g
            .connect(NodeId::new(0), NodeId::new(9), EdgeKind::Encode)
            .unwrap_err();
        assert!(matches!(err, MeshGraphError::InvalidGraph(_)));
        assert!(g.add_node(node(1, 5.0, 5.0, 0)).is_err());
        assert!(g.validate_invariants().is_ok());
    }

    #[test]
    fn offset_and_relabel_round_trip() {
        let g = triangle();
        let shifted = g.offset_ids(10);
        assert!(!shifted.has_contiguous_ids());
        assert_eq!(shifted.edges()[2].endpoints(), (NodeId::new(10), NodeId::new(12)));
        let (back, old) = shifted.relabel_contiguous();
        assert_eq!(back, g);
        assert_eq!(old, vec![NodeId::new(10), NodeId::new(11), NodeId::new(12)]);
    }

    #[test]
    fn split_by_direction_keeps_touched_nodes() {
        let parts = triangle().split_by_edge(|e| e.kind.direction());
        assert_eq!(parts["same"].num_edges(), 2);
        assert_eq!(parts["same"].num_nodes(), 2);
        assert_eq!(parts["up"].num_nodes(), 2);
        assert!(parts["up"].contains_node(NodeId::new(2)));
    }

    #[test]
    fn union_rejects_conflicting_nodes() {
        let a = triangle();
        let b = Graph::from_nodes([node(0, 9.0, 9.0, 0)]).unwrap();
        assert!(Graph::union([&a, &b]).is_err());
        let mut merged = Graph::union([&a, &a]).unwrap();
        assert_eq!(merged.num_edges(), 6);
        merged.dedup_edges();
        assert_eq!(merged.num_edges(), 3);
    }

    #[test]
    fn layered_positions_use_level() {
        let pos = triangle().layered_positions(10.0);
        assert_eq!(pos[2], (NodeId::new(2), [0.0, 1.0, 10.0]));
        assert_eq!(triangle().longest_edge(), Some(1.0));
    }
}
