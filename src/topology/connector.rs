//! `ConnectorGraph`: bipartite graphs linking data points to a mesh.
//!
//! The node id space is split into two partitions. The data partition uses
//! contiguous ids `0..n` over the participating coordinates and keeps the
//! original coordinate index of each; the mesh partition reuses the target
//! mesh graph's ids unchanged. Encode connectors point data -> mesh, decode
//! connectors mesh -> data, so an edge's partitions are implied by the role.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::geometry::Point;
use crate::mesh_error::MeshGraphError;
use crate::topology::edge::{EdgeKind, MeshEdge};
use crate::topology::graph::Graph;
use crate::topology::node::{MeshNode, NodeId};

/// Direction of a connector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorRole {
    /// Data -> mesh (g2m).
    Encode,
    /// Mesh -> data (m2g).
    Decode,
}

impl ConnectorRole {
    pub fn edge_kind(self) -> EdgeKind {
        match self {
            ConnectorRole::Encode => EdgeKind::Encode,
            ConnectorRole::Decode => EdgeKind::Decode,
        }
    }
}

/// Directed bipartite graph between data points and mesh nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectorGraph {
    role: ConnectorRole,
    data: Vec<MeshNode>,
    data_index: Vec<usize>,
    mesh: BTreeMap<NodeId, MeshNode>,
    edges: Vec<MeshEdge>,
}

impl ConnectorGraph {
    /// Empty connector over the given data points and every node of `mesh`.
    ///
    /// `data` holds `(original coordinate index, position)` pairs; data node
    /// `j` is the `j`-th pair.
    pub fn new(role: ConnectorRole, data: &[(usize, Point)], mesh: &Graph) -> Self {
        Self {
            role,
            data: data
                .iter()
                .enumerate()
                .map(|(j, &(_, pos))| MeshNode::data(NodeId::new(j), pos))
                .collect(),
            data_index: data.iter().map(|&(i, _)| i).collect(),
            mesh: mesh.nodes().map(|n| (n.id, *n)).collect(),
            edges: Vec::new(),
        }
    }

    /// Add the edge between data node `data` and mesh node `mesh`, oriented
    /// by the connector role.
    pub fn connect(&mut self, data: NodeId, mesh: NodeId) -> Result<(), MeshGraphError> {
        let (Some(d), Some(m)) = (self.data.get(data.get()), self.mesh.get(&mesh)) else {
            return Err(MeshGraphError::InvalidGraph(format!(
                "connector endpoint missing: data {data}, mesh {mesh}"
            )));
        };
        let edge = match self.role {
            ConnectorRole::Encode => MeshEdge::between(d, m, EdgeKind::Encode),
            ConnectorRole::Decode => MeshEdge::between(m, d, EdgeKind::Decode),
        };
        self.edges.push(edge);
        Ok(())
    }

    pub fn role(&self) -> ConnectorRole {
        self.role
    }

    /// Data partition nodes, id `j` at position `j`.
    pub fn data_nodes(&self) -> &[MeshNode] {
        &self.data
    }

    /// Mesh partition nodes in ascending id order.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = &MeshNode> + '_ {
        self.mesh.values()
    }

    pub fn edges(&self) -> &[MeshEdge] {
        &self.edges
    }

    pub fn num_data_nodes(&self) -> usize {
        self.data.len()
    }

    pub fn num_mesh_nodes(&self) -> usize {
        self.mesh.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Original coordinate index of every data node.
    pub fn data_index(&self) -> &[usize] {
        &self.data_index
    }

    /// Original coordinate index of data node `data`.
    pub fn original_index(&self, data: NodeId) -> Option<usize> {
        self.data_index.get(data.get()).copied()
    }

    /// Data-side and mesh-side endpoint of an edge.
    pub fn split_endpoints(&self, edge: &MeshEdge) -> (NodeId, NodeId) {
        match self.role {
            ConnectorRole::Encode => (edge.source, edge.target),
            ConnectorRole::Decode => (edge.target, edge.source),
        }
    }

    /// Flatten into a plain [`Graph`] in a shared id space: data nodes take
    /// their original coordinate index, mesh nodes take `mesh_offset + id`.
    pub fn to_graph(&self, mesh_offset: usize) -> Result<Graph, MeshGraphError> {
        let data_id = |id: NodeId| NodeId::new(self.data_index[id.get()]);
        let nodes = self
            .data
            .iter()
            .map(|n| n.with_id(data_id(n.id)))
            .chain(self.mesh.values().map(|n| n.with_id(n.id.offset(mesh_offset))));
        let edges = self.edges.iter().map(|e| {
            let (d, m) = self.split_endpoints(e);
            let (d, m) = (data_id(d), m.offset(mesh_offset));
            let (source, target) = match self.role {
                ConnectorRole::Encode => (d, m),
                ConnectorRole::Decode => (m, d),
            };
            MeshEdge { source, target, ..*e }
        });
        Graph::from_parts(nodes, edges)
    }
}

impl DebugInvariants for ConnectorGraph {
    fn validate_invariants(&self) -> Result<(), MeshGraphError> {
        if self.data.len() != self.data_index.len() {
            return Err(MeshGraphError::InvalidGraph(format!(
                "{} data nodes but {} index entries",
                self.data.len(),
                self.data_index.len()
            )));
        }
        if let Some((j, n)) = self.data.iter().enumerate().find(|(j, n)| n.id.get() != *j) {
            return Err(MeshGraphError::InvalidGraph(format!(
                "data node at position {j} has id {}",
                n.id
            )));
        }
        for e in &self.edges {
            let (d, m) = self.split_endpoints(e);
            if d.get() >= self.data.len() || !self.mesh.contains_key(&m) {
                return Err(MeshGraphError::InvalidGraph(format!(
                    "{:?} edge {} -> {} does not cross partitions",
                    self.role, e.source, e.target
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> Graph {
        Graph::from_nodes([
            MeshNode::mesh(NodeId::new(0), Point::new(0.0, 0.0), 0),
            MeshNode::mesh(NodeId::new(1), Point::new(2.0, 0.0), 0),
        ])
        .unwrap()
    }

    #[test]
    fn decode_edges_point_from_mesh_to_data() {
        let data = [(4, Point::new(0.5, 0.0)), (7, Point::new(2.0, 1.0))];
        let mut c = ConnectorGraph::new(ConnectorRole::Decode, &data, &mesh());
        c.connect(NodeId::new(1), NodeId::new(1)).unwrap();
        let e = c.edges()[0];
        assert_eq!(e.endpoints(), (NodeId::new(1), NodeId::new(1)));
        assert_eq!(e.vdiff, [0.0, -1.0]);
        assert_eq!(c.split_endpoints(&e), (NodeId::new(1), NodeId::new(1)));
        assert_eq!(c.original_index(NodeId::new(1)), Some(7));
        assert!(c.validate_invariants().is_ok());
        assert!(c.connect(NodeId::new(2), NodeId::new(0)).is_err());
    }

    #[test]
    fn flattened_graph_uses_original_indices() {
        let data = [(4, Point::new(0.5, 0.0))];
        let mut c = ConnectorGraph::new(ConnectorRole::Encode, &data, &mesh());
        c.connect(NodeId::new(0), NodeId::new(0)).unwrap();
        let g = c.to_graph(10).unwrap();
        assert_eq!(g.edges()[0].endpoints(), (NodeId::new(4), NodeId::new(10)));
        assert_eq!(g.num_nodes(), 3);
    }
}
