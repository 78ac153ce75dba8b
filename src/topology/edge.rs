//! Directed edges with their derived geometric attributes.

use serde::{Deserialize, Serialize};

use crate::geometry::pairwise_edge_attributes;
use crate::topology::node::{MeshNode, NodeId};

/// The relation an edge expresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Proximity edge within one mesh level.
    Mesh { level: usize },
    /// From a finer level to the next coarser one.
    Up { from: usize, to: usize },
    /// From a coarser level to the next finer one.
    Down { from: usize, to: usize },
    /// Data point to mesh node (g2m).
    Encode,
    /// Mesh node to data point (m2g).
    Decode,
}

impl EdgeKind {
    /// Short direction label: `same`, `up`, `down`, `g2m` or `m2g`.
    pub fn direction(self) -> &'static str {
        match self {
            EdgeKind::Mesh { .. } => "same",
            EdgeKind::Up { .. } => "up",
            EdgeKind::Down { .. } => "down",
            EdgeKind::Encode => "g2m",
            EdgeKind::Decode => "m2g",
        }
    }
}

/// A directed edge `source -> target`.
///
/// `vdiff` is always `pos(source) - pos(target)` and `length` its norm.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub length: f64,
    pub vdiff: [f64; 2],
    pub kind: EdgeKind,
}

impl MeshEdge {
    /// Edge between two nodes with attributes derived from their positions.
    pub fn between(source: &MeshNode, target: &MeshNode, kind: EdgeKind) -> Self {
        let (length, vdiff) = pairwise_edge_attributes(source.pos, target.pos);
        Self {
            source: source.id,
            target: target.id,
            length,
            vdiff,
            kind,
        }
    }

    /// `(source, target)` pair.
    #[inline]
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }

    /// The opposing edge with `vdiff` negated and the given kind.
    pub fn reversed(&self, kind: EdgeKind) -> Self {
        Self {
            source: self.target,
            target: self.source,
            length: self.length,
            vdiff: [-self.vdiff[0], -self.vdiff[1]],
            kind,
        }
    }

    /// Same edge with both endpoints passed through `f`.
    pub fn map_ids(&self, mut f: impl FnMut(NodeId) -> NodeId) -> Self {
        Self {
            source: f(self.source),
            target: f(self.target),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn reversed_edge_negates_displacement() {
        let a = MeshNode::mesh(NodeId::new(0), Point::new(0.0, 0.0), 0);
        let b = MeshNode::mesh(NodeId::new(1), Point::new(3.0, 4.0), 1);
        let up = MeshEdge::between(&a, &b, EdgeKind::Up { from: 0, to: 1 });
        assert_eq!(up.vdiff, [-3.0, -4.0]);
        assert_eq!(up.length, 5.0);
        let down = up.reversed(EdgeKind::Down { from: 1, to: 0 });
        assert_eq!(down.endpoints(), (NodeId::new(1), NodeId::new(0)));
        assert_eq!(down.vdiff, [3.0, 4.0]);
        assert_eq!(down.kind.direction(), "down");
    }
}
