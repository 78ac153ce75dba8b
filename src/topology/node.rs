//! `NodeId` and `MeshNode`: vertices of mesh and connector graphs.
//!
//! Node ids are plain integers starting at 0 so they can be exported directly
//! as tensor indices. A node belongs to exactly one graph; relations between
//! levels or between data points and the mesh are always expressed with
//! edges, never with shared node identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Strongly typed node index.
///
/// `repr(transparent)` over `usize`, so slices of ids can be handed to
/// index-based consumers without conversion.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub const fn new(raw: usize) -> Self {
        NodeId(raw)
    }

    /// Raw index value.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// This id shifted by `offset`.
    #[inline]
    pub const fn offset(self, offset: usize) -> Self {
        NodeId(self.0 + offset)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeId").field(&self.0).finish()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(raw: usize) -> Self {
        NodeId(raw)
    }
}

/// Which partition a node belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeKind {
    /// Auxiliary mesh vertex.
    #[default]
    Mesh,
    /// One of the original input coordinates.
    Data,
}

/// A graph vertex with its position and hierarchy level.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub id: NodeId,
    pub pos: Point,
    /// 0 is the finest level; coarser levels count upwards.
    pub level: usize,
    pub kind: NodeKind,
}

impl MeshNode {
    /// A mesh node on `level`.
    pub fn mesh(id: NodeId, pos: Point, level: usize) -> Self {
        Self {
            id,
            pos,
            level,
            kind: NodeKind::Mesh,
        }
    }

    /// A data node; data points always sit on level 0.
    pub fn data(id: NodeId, pos: Point) -> Self {
        Self {
            id,
            pos,
            level: 0,
            kind: NodeKind::Data,
        }
    }

    /// Copy of this node under a different id.
    pub fn with_id(self, id: NodeId) -> Self {
        Self { id, ..self }
    }
}
