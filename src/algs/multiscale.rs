//! Flat multiscale meshes.
//!
//! A nested hierarchy is built and then collapsed onto the finest level:
//! every coarser node coincides with a level 0 node, so coarse edges are
//! re-attached to those level 0 nodes and the result is a single graph with
//! long- and short-range edges over one node set.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algs::grid::{GridOptions, build_grid};
use crate::algs::hierarchy::{
    HierarchyOptions, LevelDims, LevelSizing, LevelStop, build_planned_lattice, plan_levels,
};
use crate::algs::proximity::{Connectivity, wire_lattice};
use crate::debug_invariants::DebugInvariants;
use crate::geometry::{BoundingBox, Point, PointIndex};
use crate::mesh_error::MeshGraphError;
use crate::topology::{EdgeKind, Graph, MeshEdge, NodeId};

/// Matching tolerance, relative to the level 0 spacing.
const ALIGN_TOL: f64 = 1e-6;

/// Options for [`create_flat_multiscale_mesh`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiscaleOptions {
    pub mesh_node_distance: f64,
    /// Odd integer `>= 3`.
    pub level_refinement_factor: f64,
    pub max_num_levels: Option<usize>,
    pub crop_to_convex_hull: bool,
    pub connectivity: Connectivity,
}

impl Default for MultiscaleOptions {
    fn default() -> Self {
        Self {
            mesh_node_distance: 3.0,
            level_refinement_factor: 3.0,
            max_num_levels: None,
            crop_to_convex_hull: false,
            connectivity: Connectivity::default(),
        }
    }
}

impl MultiscaleOptions {
    fn hierarchy(&self) -> HierarchyOptions {
        HierarchyOptions {
            mesh_node_distance: self.mesh_node_distance,
            level_refinement_factor: self.level_refinement_factor,
            max_num_levels: self.max_num_levels,
            crop_to_convex_hull: self.crop_to_convex_hull,
            connectivity: self.connectivity,
            sizing: LevelSizing::Nested,
        }
    }

    pub fn validate(&self) -> Result<(), MeshGraphError> {
        self.hierarchy().validate()
    }
}

/// Result of [`create_flat_multiscale_mesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct FlatMultiscaleMesh {
    graph: Graph,
    dims: Vec<LevelDims>,
    stop: LevelStop,
}

impl FlatMultiscaleMesh {
    /// Level 0 nodes with the edges of every level.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn dims(&self) -> &[LevelDims] {
        &self.dims
    }

    pub fn num_levels(&self) -> usize {
        self.dims.len()
    }

    pub fn stop_reason(&self) -> LevelStop {
        self.stop
    }

    /// Number of edges contributed by `level`.
    pub fn edges_on_level(&self, level: usize) -> usize {
        self.graph
            .edges()
            .iter()
            .filter(|e| e.kind == EdgeKind::Mesh { level })
            .count()
    }
}

pub fn create_flat_multiscale_mesh(
    coords: &[Point],
    opts: &MultiscaleOptions,
) -> Result<FlatMultiscaleMesh, MeshGraphError> {
    let bbox = BoundingBox::from_points(coords)?;
    let (mut dims, mut stop) = plan_levels(&bbox, &opts.hierarchy())?;
    let Some((first, coarser)) = dims.split_first() else {
        return Err(MeshGraphError::LevelCount(0));
    };

    let grid_opts = GridOptions::with_dims(first.nx, first.ny).cropped(opts.crop_to_convex_hull);
    let base = build_grid(coords, &grid_opts)?;
    let spacing = base.spacing();
    let level0 = wire_lattice(&base, opts.connectivity)?;
    let ids: Vec<NodeId> = level0.node_ids().collect();
    let positions: Vec<Point> = level0.nodes().map(|n| n.pos).collect();
    let index = PointIndex::new(&positions);
    let tol = ALIGN_TOL * spacing[0].min(spacing[1]);
    let mut edges: Vec<MeshEdge> = level0.edges().to_vec();
    let mut kept = dims.len();

    for d in coarser {
        let lattice = match build_planned_lattice(coords, *d, opts.crop_to_convex_hull)? {
            Ok(lattice) => lattice,
            Err(cropped) => {
                stop = cropped;
                kept = d.level;
                break;
            }
        };
        let level = wire_lattice(&lattice, opts.connectivity)?;
        // coarse id -> coinciding level 0 id
        let mut onto = vec![NodeId::new(0); level.num_nodes()];
        for n in level.nodes() {
            match index.nearest(n.pos) {
                Some((i, dist)) if dist <= tol => onto[n.id.get()] = ids[i],
                _ => {
                    return Err(MeshGraphError::NestedAlignment {
                        level: d.level,
                        node: n.id.get(),
                    });
                }
            }
        }
        for e in level.edges() {
            let (s, t) = (onto[e.source.get()], onto[e.target.get()]);
            if let (Some(s), Some(t)) = (level0.node(s), level0.node(t)) {
                edges.push(MeshEdge::between(s, t, e.kind));
            }
        }
    }
    dims.truncate(kept);

    let unique = edges.into_iter().unique_by(|e| e.endpoints());
    let graph = Graph::from_parts(level0.nodes().copied(), unique)?;
    graph.debug_assert_invariants();
    log::debug!(
        "flat multiscale mesh: {} levels, {} nodes, {} edges",
        dims.len(),
        graph.num_nodes(),
        graph.num_edges()
    );
    Ok(FlatMultiscaleMesh { graph, dims, stop })
}
