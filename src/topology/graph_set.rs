//! `GraphSet`: the named collection of graphs handed back to callers.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshGraphError;
use crate::topology::connector::ConnectorGraph;
use crate::topology::graph::Graph;

/// Grid-to-mesh (encode) connector.
pub const G2M: &str = "g2m";
/// Mesh-to-mesh processing graph.
pub const M2M: &str = "m2m";
/// Mesh-to-grid (decode) connector.
pub const M2G: &str = "m2g";

/// Name of the same-level graph of hierarchy level `level`.
pub fn level_name(level: usize) -> String {
    format!("m2m_level_{level}")
}

/// Name of the up graph from `level` to `level + 1`.
pub fn up_name(level: usize) -> String {
    format!("m2m_up_{level}_{}", level + 1)
}

/// Name of the down graph from `level + 1` to `level`.
pub fn down_name(level: usize) -> String {
    format!("m2m_down_{}_{level}", level + 1)
}

/// One entry of a [`GraphSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GraphComponent {
    Mesh(Graph),
    Connector(ConnectorGraph),
}

impl GraphComponent {
    pub fn as_mesh(&self) -> Option<&Graph> {
        match self {
            GraphComponent::Mesh(g) => Some(g),
            GraphComponent::Connector(_) => None,
        }
    }

    pub fn as_connector(&self) -> Option<&ConnectorGraph> {
        match self {
            GraphComponent::Connector(c) => Some(c),
            GraphComponent::Mesh(_) => None,
        }
    }

    pub fn num_edges(&self) -> usize {
        match self {
            GraphComponent::Mesh(g) => g.num_edges(),
            GraphComponent::Connector(c) => c.num_edges(),
        }
    }
}

impl From<Graph> for GraphComponent {
    fn from(g: Graph) -> Self {
        GraphComponent::Mesh(g)
    }
}

impl From<ConnectorGraph> for GraphComponent {
    fn from(c: ConnectorGraph) -> Self {
        GraphComponent::Connector(c)
    }
}

/// Named graphs, iterated in name order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSet {
    graphs: BTreeMap<String, GraphComponent>,
}

impl GraphSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the graph called `name`.
    pub fn insert(&mut self, name: impl Into<String>, graph: impl Into<GraphComponent>) {
        self.graphs.insert(name.into(), graph.into());
    }

    pub fn get(&self, name: &str) -> Option<&GraphComponent> {
        self.graphs.get(name)
    }

    pub fn mesh(&self, name: &str) -> Option<&Graph> {
        self.get(name).and_then(GraphComponent::as_mesh)
    }

    pub fn connector(&self, name: &str) -> Option<&ConnectorGraph> {
        self.get(name).and_then(GraphComponent::as_connector)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graphs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.graphs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphComponent)> + '_ {
        self.graphs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Flatten `g2m`, `m2m` and `m2g` into one graph.
    ///
    /// Data nodes keep their original coordinate index `0..num_coords`, mesh
    /// nodes are shifted to `num_coords + id`. The mesh graph and both
    /// connectors must share one mesh id space.
    pub fn merge_components(&self, num_coords: usize) -> Result<Graph, MeshGraphError> {
        let missing =
            |name: &str| MeshGraphError::InvalidGraph(format!("graph set has no `{name}`"));
        let g2m = self.connector(G2M).ok_or_else(|| missing(G2M))?;
        let m2m = self.mesh(M2M).ok_or_else(|| missing(M2M))?;
        let m2g = self.connector(M2G).ok_or_else(|| missing(M2G))?;
        let parts = [
            g2m.to_graph(num_coords)?,
            m2m.offset_ids(num_coords),
            m2g.to_graph(num_coords)?,
        ];
        Graph::union(&parts)
    }
}

impl Index<&str> for GraphSet {
    type Output = GraphComponent;

    fn index(&self, name: &str) -> &GraphComponent {
        &self.graphs[name]
    }
}

impl<'a> IntoIterator for &'a GraphSet {
    type Item = (&'a String, &'a GraphComponent);
    type IntoIter = std::collections::btree_map::Iter<'a, String, GraphComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.graphs.iter()
    }
}
