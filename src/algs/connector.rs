//! Connector construction between data points and a mesh graph.
//!
//! Encode connectors link every data point to nearby mesh nodes
//! (data -> mesh); decode connectors link mesh nodes back to data points
//! (mesh -> data), optionally restricted to a boolean mask over the input
//! coordinates.

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::geometry::{Point, PointIndex};
use crate::mesh_error::MeshGraphError;
use crate::topology::{ConnectorGraph, ConnectorRole, Graph, NodeId};

/// Connection radius.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusRule {
    /// Fixed radius in coordinate units.
    Absolute(f64),
    /// `factor * longest edge` of the target mesh.
    RelativeToLongestEdge(f64),
}

/// Which mesh nodes a data point is connected to.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRule {
    Nearest,
    NearestK(usize),
    WithinRadius(RadiusRule),
}

impl ConnectionRule {
    /// Within `0.51` times the longest mesh edge.
    pub const fn encode_default() -> Self {
        ConnectionRule::WithinRadius(RadiusRule::RelativeToLongestEdge(0.51))
    }

    /// The four nearest mesh nodes.
    pub const fn decode_default() -> Self {
        ConnectionRule::NearestK(4)
    }

    pub fn validate(&self) -> Result<(), MeshGraphError> {
        match *self {
            ConnectionRule::NearestK(0) => Err(MeshGraphError::ConnectorRule(
                "nearest_k needs at least one neighbour".into(),
            )),
            ConnectionRule::WithinRadius(
                RadiusRule::Absolute(r) | RadiusRule::RelativeToLongestEdge(r),
            ) if !(r.is_finite() && r > 0.0) =>
            {
                Err(MeshGraphError::InvalidRadius(r))
            }
            _ => Ok(()),
        }
    }

    fn resolve(&self, mesh: &Graph) -> Result<Query, MeshGraphError> {
        self.validate()?;
        if mesh.num_nodes() == 0 {
            return Err(MeshGraphError::ConnectorRule("target mesh has no nodes".into()));
        }
        Ok(match *self {
            ConnectionRule::Nearest => Query::Nearest,
            ConnectionRule::NearestK(k) => Query::NearestK(k),
            ConnectionRule::WithinRadius(RadiusRule::Absolute(r)) => Query::Radius(r),
            ConnectionRule::WithinRadius(RadiusRule::RelativeToLongestEdge(f)) => {
                let longest = mesh.longest_edge().ok_or_else(|| {
                    MeshGraphError::ConnectorRule(
                        "relative radius needs a target mesh with at least one edge".into(),
                    )
                })?;
                Query::Radius(f * longest)
            }
        })
    }
}

#[derive(Copy, Clone, Debug)]
enum Query {
    Nearest,
    NearestK(usize),
    Radius(f64),
}

/// Mapping between original coordinate indices and the contiguous data ids
/// of a masked connector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskIndexMap {
    forward: Vec<Option<usize>>,
    retained: Vec<usize>,
}

impl MaskIndexMap {
    /// `forward[i]` is the number of `true` entries before `i` when `mask[i]`
    /// holds, `None` otherwise.
    pub fn from_mask(mask: &[bool]) -> Self {
        let mut forward = Vec::with_capacity(mask.len());
        let mut retained = Vec::new();
        for (i, &keep) in mask.iter().enumerate() {
            if keep {
                forward.push(Some(retained.len()));
                retained.push(i);
            } else {
                forward.push(None);
            }
        }
        Self { forward, retained }
    }

    /// Every index retained.
    pub fn identity(n: usize) -> Self {
        Self {
            forward: (0..n).map(Some).collect(),
            retained: (0..n).collect(),
        }
    }

    pub fn forward(&self) -> &[Option<usize>] {
        &self.forward
    }

    /// Original index of every retained entry, in order.
    pub fn retained(&self) -> &[usize] {
        &self.retained
    }

    pub fn to_local(&self, original: usize) -> Option<usize> {
        self.forward.get(original).copied().flatten()
    }

    pub fn to_original(&self, local: usize) -> Option<usize> {
        self.retained.get(local).copied()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

/// See [`MaskIndexMap::from_mask`].
pub fn mask_index_map(mask: &[bool]) -> MaskIndexMap {
    MaskIndexMap::from_mask(mask)
}

/// Build a connector between `coords` and `mesh`.
///
/// With a `mask`, only coordinates whose entry is `true` become data nodes.
/// Data points with no mesh node in range are left unconnected.
pub fn build_connector(
    role: ConnectorRole,
    coords: &[Point],
    mesh: &Graph,
    rule: ConnectionRule,
    mask: Option<&[bool]>,
) -> Result<ConnectorGraph, MeshGraphError> {
    let query = rule.resolve(mesh)?;
    let map = match mask {
        Some(mask) if mask.len() != coords.len() => {
            return Err(MeshGraphError::MaskLength {
                expected: coords.len(),
                actual: mask.len(),
            });
        }
        Some(mask) => MaskIndexMap::from_mask(mask),
        None => MaskIndexMap::identity(coords.len()),
    };

    let data: Vec<(usize, Point)> = map.retained().iter().map(|&i| (i, coords[i])).collect();
    let mut connector = ConnectorGraph::new(role, &data, mesh);
    let mesh_ids: Vec<NodeId> = mesh.node_ids().collect();
    let positions: Vec<Point> = mesh.nodes().map(|n| n.pos).collect();
    let index = PointIndex::new(&positions);

    let mut unconnected = 0usize;
    for (j, &(_, pos)) in data.iter().enumerate() {
        let hits = match query {
            Query::Nearest => index.nearest(pos).into_iter().collect(),
            Query::NearestK(k) => index.nearest_k(pos, k),
            Query::Radius(r) => index.within_radius(pos, r),
        };
        if hits.is_empty() {
            unconnected += 1;
        }
        for (m, _) in hits {
            connector.connect(NodeId::new(j), mesh_ids[m])?;
        }
    }
    if unconnected > 0 {
        log::warn!(
            "{role:?} connector: {unconnected} of {} data points have no mesh node in range",
            data.len()
        );
    }
    log::debug!(
        "{role:?} connector: {} data nodes, {} mesh nodes, {} edges",
        connector.num_data_nodes(),
        connector.num_mesh_nodes(),
        connector.num_edges()
    );
    connector.debug_assert_invariants();
    Ok(connector)
}

/// Grid-to-mesh connector over every coordinate.
pub fn connect_encode(
    coords: &[Point],
    mesh: &Graph,
    rule: ConnectionRule,
) -> Result<ConnectorGraph, MeshGraphError> {
    build_connector(ConnectorRole::Encode, coords, mesh, rule, None)
}

/// Mesh-to-grid connector, restricted to `decode_mask` when given.
pub fn connect_decode(
    coords: &[Point],
    mesh: &Graph,
    rule: ConnectionRule,
    decode_mask: Option<&[bool]>,
) -> Result<ConnectorGraph, MeshGraphError> {
    build_connector(ConnectorRole::Decode, coords, mesh, rule, decode_mask)
}
