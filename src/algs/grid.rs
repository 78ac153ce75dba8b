//! Regular lattice mesh generation with optional convex-hull cropping.
//!
//! Nodes sit at the cell centres of an `nx`×`ny` partition of the coordinate
//! bounding box, so no node lies on the box border. Cropping drops nodes
//! outside the convex hull of the input coordinates and renumbers the
//! survivors contiguously in row-major order.

use serde::{Deserialize, Serialize};

use crate::geometry::lattice::lattice_slot;
use crate::geometry::{Axis, BoundingBox, Point, convex_hull, regular_grid_coordinates};
use crate::mesh_error::MeshGraphError;
use crate::topology::{Graph, MeshNode, NodeId};

/// How many lattice nodes to place along each axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridResolution {
    /// Explicit node counts.
    Dims { nx: usize, ny: usize },
    /// Target spacing; counts are `floor(extent / distance)` per axis.
    NodeDistance(f64),
}

impl Default for GridResolution {
    fn default() -> Self {
        GridResolution::NodeDistance(3.0)
    }
}

/// Options for [`build_grid`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub resolution: GridResolution,
    pub crop_to_convex_hull: bool,
    /// Level written onto every node.
    pub level: usize,
}

impl GridOptions {
    pub fn with_dims(nx: usize, ny: usize) -> Self {
        Self {
            resolution: GridResolution::Dims { nx, ny },
            ..Self::default()
        }
    }

    pub fn with_node_distance(mesh_node_distance: f64) -> Self {
        Self {
            resolution: GridResolution::NodeDistance(mesh_node_distance),
            ..Self::default()
        }
    }

    pub fn cropped(mut self, crop_to_convex_hull: bool) -> Self {
        self.crop_to_convex_hull = crop_to_convex_hull;
        self
    }

    pub fn on_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }
}

/// Check a `mesh_node_distance` value.
pub(crate) fn validate_node_distance(d: f64) -> Result<(), MeshGraphError> {
    if d.is_finite() && d > 0.0 {
        Ok(())
    } else {
        Err(MeshGraphError::InvalidNodeDistance(d))
    }
}

/// Node counts implied by `spacing` over `bbox`.
///
/// Fails when fewer than two nodes fit along an axis, naming that axis.
pub fn grid_dims_for_spacing(
    bbox: &BoundingBox,
    spacing: f64,
) -> Result<(usize, usize), MeshGraphError> {
    validate_node_distance(spacing)?;
    let mut dims = [0usize; 2];
    for (slot, axis) in dims.iter_mut().zip(Axis::BOTH) {
        let extent = bbox.extent(axis);
        let nodes = (extent / spacing).floor() as usize;
        if nodes < 2 {
            return Err(MeshGraphError::MeshSpacing {
                axis,
                extent,
                spacing,
                nodes,
            });
        }
        *slot = nodes;
    }
    Ok((dims[0], dims[1]))
}

/// Resolve a [`GridResolution`] against a bounding box.
pub fn resolve_dims(
    bbox: &BoundingBox,
    resolution: GridResolution,
) -> Result<(usize, usize), MeshGraphError> {
    let (nx, ny) = match resolution {
        GridResolution::Dims { nx, ny } => {
            if nx < 2 || ny < 2 {
                return Err(MeshGraphError::GridDims { nx, ny });
            }
            (nx, ny)
        }
        GridResolution::NodeDistance(d) => grid_dims_for_spacing(bbox, d)?,
    };
    for (axis, n) in [(Axis::X, nx), (Axis::Y, ny)] {
        let extent = bbox.extent(axis);
        if !(extent > 0.0) {
            return Err(MeshGraphError::MeshSpacing {
                axis,
                extent,
                spacing: extent / n as f64,
                nodes: 1,
            });
        }
    }
    Ok((nx, ny))
}

/// A mesh graph whose nodes came from a regular lattice.
///
/// Keeps the lattice slot of every node so neighbour patterns can be applied
/// after cropping.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeMesh {
    graph: Graph,
    nx: usize,
    ny: usize,
    spacing: [f64; 2],
    slots: Vec<Option<NodeId>>,
    level: usize,
}

impl LatticeMesh {
    /// Node graph without edges.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Lattice dimensions before cropping.
    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Node spacing along x and y.
    pub fn spacing(&self) -> [f64; 2] {
        self.spacing
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Node at column `i`, row `j`, if it survived cropping.
    pub fn node_at(&self, i: usize, j: usize) -> Option<NodeId> {
        if i < self.nx && j < self.ny {
            self.slots[lattice_slot(self.nx, i, j)]
        } else {
            None
        }
    }

    /// Surviving nodes with their `(i, j)` lattice position, row-major.
    pub fn lattice_nodes(&self) -> impl Iterator<Item = (usize, usize, NodeId)> + '_ {
        let nx = self.nx;
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(s, id)| id.map(|id| (s % nx, s / nx, id)))
    }
}

/// Build the lattice node set for `coords`.
pub fn build_grid(coords: &[Point], opts: &GridOptions) -> Result<LatticeMesh, MeshGraphError> {
    let bbox = BoundingBox::from_points(coords)?;
    let (nx, ny) = resolve_dims(&bbox, opts.resolution)?;
    let dx = bbox.extent(Axis::X) / nx as f64;
    let dy = bbox.extent(Axis::Y) / ny as f64;
    let lattice = regular_grid_coordinates(nx, ny, &bbox.inset(0.5 * dx, 0.5 * dy));

    let keep: Vec<bool> = if opts.crop_to_convex_hull {
        let hull = convex_hull(coords)?;
        let keep: Vec<bool> = lattice.iter().map(|&p| hull.contains(p)).collect();
        if !keep.contains(&true) {
            return Err(MeshGraphError::EmptyCrop {
                nx,
                ny,
                hull_vertices: hull.vertices().len(),
                extent_x: bbox.extent(Axis::X),
                extent_y: bbox.extent(Axis::Y),
            });
        }
        keep
    } else {
        vec![true; lattice.len()]
    };

    let mut graph = Graph::new();
    let mut slots = Vec::with_capacity(lattice.len());
    for (pos, kept) in lattice.into_iter().zip(keep) {
        if kept {
            let id = NodeId::new(graph.num_nodes());
            graph.add_node(MeshNode::mesh(id, pos, opts.level))?;
            slots.push(Some(id));
        } else {
            slots.push(None);
        }
    }
    log::debug!(
        "level {} grid {nx}x{ny}: {} of {} nodes kept",
        opts.level,
        graph.num_nodes(),
        slots.len()
    );

    Ok(LatticeMesh {
        graph,
        nx,
        ny,
        spacing: [dx, dy],
        slots,
        level: opts.level,
    })
}
