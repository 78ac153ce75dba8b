//! Named graph archetypes: complete encode/process/decode graph sets.
//!
//! Every archetype produces the three graphs `g2m`, `m2m` and `m2g`; they
//! differ only in how the mesh is laid out. Connectors always attach to the
//! finest mesh level.

use serde::{Deserialize, Serialize};

use crate::algs::connector::{ConnectionRule, connect_decode, connect_encode};
use crate::algs::grid::{GridOptions, GridResolution, build_grid};
use crate::algs::hierarchy::{HierarchyOptions, LevelSizing, create_hierarchical_mesh};
use crate::algs::multiscale::{MultiscaleOptions, create_flat_multiscale_mesh};
use crate::algs::proximity::{Connectivity, wire_lattice};
use crate::geometry::{Point, ToPoint, points_from};
use crate::mesh_error::MeshGraphError;
use crate::topology::{EdgeKind, G2M, Graph, GraphSet, M2G, M2M};

/// How the processing mesh is laid out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshLayout {
    /// One regular lattice.
    #[default]
    SingleScale,
    /// Nested levels collapsed onto the finest level's nodes.
    FlatMultiscale,
    /// Separate levels linked by up/down edges.
    Hierarchical,
}

/// Options shared by every archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeOptions {
    pub resolution: GridResolution,
    pub level_refinement_factor: f64,
    pub max_num_levels: Option<usize>,
    pub crop_to_convex_hull: bool,
    pub m2m_connectivity: Connectivity,
    pub g2m_rule: ConnectionRule,
    pub m2g_rule: ConnectionRule,
    /// One entry per coordinate; only `true` points are decoded to.
    pub decode_mask: Option<Vec<bool>>,
    /// Return the named components instead of one merged graph.
    pub return_components: bool,
}

impl Default for ArchetypeOptions {
    fn default() -> Self {
        Self {
            resolution: GridResolution::default(),
            level_refinement_factor: 3.0,
            max_num_levels: None,
            crop_to_convex_hull: false,
            m2m_connectivity: Connectivity::default(),
            g2m_rule: ConnectionRule::encode_default(),
            m2g_rule: ConnectionRule::decode_default(),
            decode_mask: None,
            return_components: false,
        }
    }
}

impl ArchetypeOptions {
    pub fn with_node_distance(mesh_node_distance: f64) -> Self {
        Self {
            resolution: GridResolution::NodeDistance(mesh_node_distance),
            ..Self::default()
        }
    }

    pub fn components(mut self) -> Self {
        self.return_components = true;
        self
    }

    pub fn with_decode_mask(mut self, mask: Vec<bool>) -> Self {
        self.decode_mask = Some(mask);
        self
    }

    /// Checks that do not depend on the coordinates.
    pub fn validate(&self) -> Result<(), MeshGraphError> {
        if let Some(0) = self.max_num_levels {
            return Err(MeshGraphError::LevelCount(0));
        }
        self.m2m_connectivity.validate()?;
        self.g2m_rule.validate()?;
        self.m2g_rule.validate()
    }

    fn node_distance(&self, layout: MeshLayout) -> Result<f64, MeshGraphError> {
        match self.resolution {
            GridResolution::NodeDistance(d) => Ok(d),
            GridResolution::Dims { nx, ny } => Err(MeshGraphError::ResolutionMismatch(format!(
                "{layout:?} meshes are sized by mesh_node_distance, got explicit dims {nx}x{ny}"
            ))),
        }
    }
}

/// Output of an archetype build.
#[derive(Clone, Debug, PartialEq)]
pub enum ArchetypeGraphs {
    /// Named `g2m`, `m2m`, `m2g` (plus hierarchy relations).
    Components(GraphSet),
    /// Data nodes `0..N`, mesh nodes `N + id`.
    Merged(Graph),
}

impl ArchetypeGraphs {
    pub fn components(&self) -> Option<&GraphSet> {
        match self {
            ArchetypeGraphs::Components(set) => Some(set),
            ArchetypeGraphs::Merged(_) => None,
        }
    }

    pub fn merged(&self) -> Option<&Graph> {
        match self {
            ArchetypeGraphs::Merged(g) => Some(g),
            ArchetypeGraphs::Components(_) => None,
        }
    }

    pub fn into_components(self) -> Option<GraphSet> {
        match self {
            ArchetypeGraphs::Components(set) => Some(set),
            ArchetypeGraphs::Merged(_) => None,
        }
    }

    pub fn into_merged(self) -> Option<Graph> {
        match self {
            ArchetypeGraphs::Merged(g) => Some(g),
            ArchetypeGraphs::Components(_) => None,
        }
    }
}

/// Build the processing mesh for `layout`.
///
/// Returns the named mesh graphs (including `m2m`) and the level 0 graph the
/// connectors attach to.
fn build_mesh(
    coords: &[Point],
    layout: MeshLayout,
    opts: &ArchetypeOptions,
) -> Result<(GraphSet, Graph), MeshGraphError> {
    let mut set = GraphSet::new();
    let base = match layout {
        MeshLayout::SingleScale => {
            let grid_opts = GridOptions {
                resolution: opts.resolution,
                crop_to_convex_hull: opts.crop_to_convex_hull,
                level: 0,
            };
            let lattice = build_grid(coords, &grid_opts)?;
            let mesh = wire_lattice(&lattice, opts.m2m_connectivity)?;
            set.insert(M2M, mesh.clone());
            mesh
        }
        MeshLayout::FlatMultiscale => {
            let mopts = MultiscaleOptions {
                mesh_node_distance: opts.node_distance(layout)?,
                level_refinement_factor: opts.level_refinement_factor,
                max_num_levels: opts.max_num_levels,
                crop_to_convex_hull: opts.crop_to_convex_hull,
                connectivity: opts.m2m_connectivity,
            };
            let mesh = create_flat_multiscale_mesh(coords, &mopts)?.into_graph();
            let finest = mesh
                .edges()
                .iter()
                .filter(|e| e.kind == EdgeKind::Mesh { level: 0 })
                .copied();
            let base = Graph::from_parts(mesh.nodes().copied(), finest)?;
            set.insert(M2M, mesh);
            base
        }
        MeshLayout::Hierarchical => {
            let hopts = HierarchyOptions {
                mesh_node_distance: opts.node_distance(layout)?,
                level_refinement_factor: opts.level_refinement_factor,
                max_num_levels: opts.max_num_levels,
                crop_to_convex_hull: opts.crop_to_convex_hull,
                connectivity: opts.m2m_connectivity,
                sizing: LevelSizing::Geometric,
            };
            let levels = create_hierarchical_mesh(coords, hopts)?;
            set = levels.to_graph_set()?;
            levels
                .level(0)
                .cloned()
                .ok_or(MeshGraphError::LevelCount(0))?
        }
    };
    Ok((set, base))
}

/// Build `g2m`, `m2m` and `m2g` for `coords` with the given mesh layout.
pub fn create_all_graph_components(
    coords: &[Point],
    layout: MeshLayout,
    opts: &ArchetypeOptions,
) -> Result<ArchetypeGraphs, MeshGraphError> {
    opts.validate()?;
    let (mut set, base) = build_mesh(coords, layout, opts)?;
    let g2m = connect_encode(coords, &base, opts.g2m_rule)?;
    let m2g = connect_decode(coords, &base, opts.m2g_rule, opts.decode_mask.as_deref())?;
    set.insert(G2M, g2m);
    set.insert(M2G, m2g);
    log::debug!("{layout:?} graph set: {:?}", set.names().collect::<Vec<_>>());

    if opts.return_components {
        Ok(ArchetypeGraphs::Components(set))
    } else {
        set.merge_components(coords.len()).map(ArchetypeGraphs::Merged)
    }
}

/// Published graph configurations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Single-scale lattice mesh.
    Keisler,
    /// Flat multiscale mesh.
    GraphCast,
    /// Hierarchical mesh with up/down edges.
    OskarssonHierarchical,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [
        Archetype::Keisler,
        Archetype::GraphCast,
        Archetype::OskarssonHierarchical,
    ];

    pub fn layout(self) -> MeshLayout {
        match self {
            Archetype::Keisler => MeshLayout::SingleScale,
            Archetype::GraphCast => MeshLayout::FlatMultiscale,
            Archetype::OskarssonHierarchical => MeshLayout::Hierarchical,
        }
    }

    /// Build from coordinates of any supported point type.
    pub fn build<I>(
        self,
        coords: I,
        opts: &ArchetypeOptions,
    ) -> Result<ArchetypeGraphs, MeshGraphError>
    where
        I: IntoIterator,
        I::Item: ToPoint,
    {
        let points = points_from(coords)?;
        self.build_from(&points, opts)
    }

    pub fn build_from(
        self,
        coords: &[Point],
        opts: &ArchetypeOptions,
    ) -> Result<ArchetypeGraphs, MeshGraphError> {
        create_all_graph_components(coords, self.layout(), opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeKind;

    fn square(n: usize, extent: f64) -> Vec<Point> {
        let step = extent / (n - 1) as f64;
        (0..n)
            .flat_map(|j| (0..n).map(move |i| Point::new(i as f64 * step, j as f64 * step)))
            .collect()
    }

    #[test]
    fn keisler_components() {
        let coords = square(10, 9.0);
        let out = Archetype::Keisler
            .build_from(&coords, &ArchetypeOptions::with_node_distance(3.0).components())
            .unwrap();
        let set = out.components().unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["g2m", "m2g", "m2m"]);
        let m2m = set.mesh(M2M).unwrap();
        assert_eq!(m2m.num_nodes(), 9);
        let m2g = set.connector(M2G).unwrap();
        assert_eq!(m2g.num_edges(), 100 * 4);
        assert_eq!(set.connector(G2M).unwrap().num_mesh_nodes(), 9);
    }

    #[test]
    fn merged_graph_offsets_mesh_ids() {
        let coords = square(10, 9.0);
        let merged = Archetype::Keisler
            .build_from(&coords, &ArchetypeOptions::with_node_distance(3.0))
            .unwrap()
            .into_merged()
            .unwrap();
        assert_eq!(merged.num_nodes(), 109);
        assert!(merged.has_contiguous_ids());
        let data = merged.nodes().filter(|n| n.kind == NodeKind::Data).count();
        assert_eq!(data, 100);
        assert!(
            merged
                .nodes()
                .filter(|n| n.kind == NodeKind::Data)
                .all(|n| n.id.get() < 100)
        );
        assert!(merged.edges().iter().any(|e| e.kind == EdgeKind::Decode));
    }

    #[test]
    fn hierarchical_set_has_relations() {
        let coords = square(28, 27.0);
        let set = Archetype::OskarssonHierarchical
            .build_from(&coords, &ArchetypeOptions::with_node_distance(3.0).components())
            .unwrap()
            .into_components()
            .unwrap();
        // 9x9, 3x3
        assert!(set.contains("m2m_level_1"));
        assert!(set.contains("m2m_up_0_1"));
        assert!(set.contains("m2m_down_1_0"));
        assert_eq!(set.connector(G2M).unwrap().num_mesh_nodes(), 81);
        assert_eq!(set.mesh(M2M).unwrap().num_nodes(), 90);
    }

    #[test]
    fn graphcast_needs_node_distance() {
        let coords = square(10, 9.0);
        let opts = ArchetypeOptions {
            resolution: GridResolution::Dims { nx: 3, ny: 3 },
            ..ArchetypeOptions::default()
        };
        assert!(matches!(
            Archetype::GraphCast.build_from(&coords, &opts).unwrap_err(),
            MeshGraphError::ResolutionMismatch(_)
        ));
        assert!(Archetype::Keisler.build_from(&coords, &opts).is_ok());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let json = r#"{"resolution": {"node_distance": 2.5}, "return_components": true}"#;
        let opts: ArchetypeOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.resolution, GridResolution::NodeDistance(2.5));
        assert_eq!(opts.m2g_rule, ConnectionRule::NearestK(4));
        assert!(opts.return_components);
    }
}
