//! Dense array views of graphs for persistence and plotting collaborators.
//!
//! Tensor writers want contiguous integer indices and flat float buffers.
//! These views relabel node ids densely (ascending id order), so every index
//! in an edge list points into the matching position/level arrays, and expose
//! the float data as flat slices without copying.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshGraphError;
use crate::topology::connector::{ConnectorGraph, ConnectorRole};
use crate::topology::graph::Graph;
use crate::topology::node::NodeId;

/// Dense view of a [`Graph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Graph node id of every dense index.
    pub node_ids: Vec<NodeId>,
    pub positions: Vec<[f64; 2]>,
    pub levels: Vec<usize>,
    /// `[sources, targets]` as dense indices.
    pub edge_index: [Vec<usize>; 2],
    pub lengths: Vec<f64>,
    pub vdiffs: Vec<[f64; 2]>,
}

impl GraphExport {
    /// Positions as `[x0, y0, x1, y1, ...]`.
    pub fn positions_flat(&self) -> &[f64] {
        bytemuck::cast_slice(self.positions.as_slice())
    }

    /// Displacements as `[dx0, dy0, dx1, dy1, ...]`.
    pub fn vdiffs_flat(&self) -> &[f64] {
        bytemuck::cast_slice(self.vdiffs.as_slice())
    }
}

/// Dense view of a [`ConnectorGraph`].
///
/// Edge indices are local to their partition: for an encode connector row 0
/// indexes `data_positions` and row 1 indexes `mesh_positions`; a decode
/// connector is the other way round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BipartiteExport {
    pub role: ConnectorRole,
    pub edge_index: [Vec<usize>; 2],
    pub lengths: Vec<f64>,
    pub vdiffs: Vec<[f64; 2]>,
    pub data_positions: Vec<[f64; 2]>,
    /// Original coordinate index of every data row.
    pub data_index: Vec<usize>,
    pub mesh_positions: Vec<[f64; 2]>,
    /// Mesh node id of every mesh row.
    pub mesh_ids: Vec<NodeId>,
}

impl BipartiteExport {
    pub fn vdiffs_flat(&self) -> &[f64] {
        bytemuck::cast_slice(self.vdiffs.as_slice())
    }
}

/// Dense index of `id` in the ascending id list `ids`.
fn dense_index(ids: &[NodeId], id: NodeId) -> Result<usize, MeshGraphError> {
    ids.binary_search(&id)
        .map_err(|_| MeshGraphError::InvalidGraph(format!("edge endpoint {id} is not a node")))
}

impl Graph {
    /// Dense arrays for this graph.
    ///
    /// Fails with [`MeshGraphError::InvalidGraph`] if an edge names a node the
    /// graph does not hold.
    pub fn to_export(&self) -> Result<GraphExport, MeshGraphError> {
        let node_ids: Vec<NodeId> = self.node_ids().collect();
        let mut edge_index: [Vec<usize>; 2] = Default::default();
        for e in self.edges() {
            edge_index[0].push(dense_index(&node_ids, e.source)?);
            edge_index[1].push(dense_index(&node_ids, e.target)?);
        }
        Ok(GraphExport {
            positions: self.nodes().map(|n| n.pos.to_array()).collect(),
            levels: self.nodes().map(|n| n.level).collect(),
            edge_index,
            lengths: self.edges().iter().map(|e| e.length).collect(),
            vdiffs: self.edges().iter().map(|e| e.vdiff).collect(),
            node_ids,
        })
    }
}

impl ConnectorGraph {
    /// Dense arrays for this connector.
    pub fn to_export(&self) -> Result<BipartiteExport, MeshGraphError> {
        let mesh_ids: Vec<NodeId> = self.mesh_nodes().map(|n| n.id).collect();
        let num_data = self.num_data_nodes();
        let mut edge_index: [Vec<usize>; 2] = Default::default();
        for e in self.edges() {
            let (d, m) = self.split_endpoints(e);
            if d.get() >= num_data {
                return Err(MeshGraphError::InvalidGraph(format!(
                    "data endpoint {d} out of range for {num_data} data nodes"
                )));
            }
            let (row, col) = match self.role() {
                ConnectorRole::Encode => (d.get(), dense_index(&mesh_ids, m)?),
                ConnectorRole::Decode => (dense_index(&mesh_ids, m)?, d.get()),
            };
            edge_index[0].push(row);
            edge_index[1].push(col);
        }
        Ok(BipartiteExport {
            role: self.role(),
            edge_index,
            lengths: self.edges().iter().map(|e| e.length).collect(),
            vdiffs: self.edges().iter().map(|e| e.vdiff).collect(),
            data_positions: self.data_nodes().iter().map(|n| n.pos.to_array()).collect(),
            data_index: self.data_index().to_vec(),
            mesh_positions: self.mesh_nodes().map(|n| n.pos.to_array()).collect(),
            mesh_ids,
        })
    }
}
