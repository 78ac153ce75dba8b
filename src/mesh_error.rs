//! MeshGraphError: unified error type for mesh-graphs public APIs
//!
//! Every fallible builder in this crate returns `Result<_, MeshGraphError>`.
//! Configuration problems fail fast and are never clamped; the variants carry
//! the requested parameters and the computed extents so a failure can be
//! diagnosed without re-running.

use crate::geometry::Axis;
use thiserror::Error;

/// Unified error type for mesh graph construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshGraphError {
    /// No input coordinates were supplied.
    #[error("configuration error: coordinate set is empty")]
    EmptyCoordinates,
    /// A coordinate could not be read as a finite 2D point.
    #[error("configuration error: coordinate {index} is invalid: {reason}")]
    InvalidCoordinate { index: usize, reason: String },
    /// `mesh_node_distance` is not a finite positive number.
    #[error("configuration error: mesh_node_distance must be finite and > 0, got {0}")]
    InvalidNodeDistance(f64),
    /// The requested spacing leaves fewer than two nodes along an axis.
    #[error(
        "configuration error: {axis} extent {extent} with spacing {spacing} gives {nodes} \
         mesh node(s), at least 2 are required along each axis"
    )]
    MeshSpacing {
        axis: Axis,
        extent: f64,
        spacing: f64,
        nodes: usize,
    },
    /// A proximity radius is not a finite positive number.
    #[error("configuration error: connection radius must be finite and > 0, got {0}")]
    InvalidRadius(f64),
    /// The chosen resolution form cannot drive the requested mesh layout.
    #[error("configuration error: {0}")]
    ResolutionMismatch(String),
    /// Explicit grid dimensions below the two-node minimum.
    #[error("configuration error: grid dimensions {nx}x{ny} are too small, need at least 2x2")]
    GridDims { nx: usize, ny: usize },
    /// Refinement factor must be finite and strictly greater than one.
    #[error("configuration error: level_refinement_factor must be > 1, got {0}")]
    RefinementFactor(f64),
    /// Nested level sizing needs an odd integer refinement factor.
    #[error(
        "configuration error: nested levels need an odd integer \
         level_refinement_factor >= 3, got {0}"
    )]
    NestedRefinementFactor(f64),
    /// `max_num_levels` must be at least one.
    #[error("configuration error: max_num_levels must be >= 1, got {0}")]
    LevelCount(usize),
    /// A decode mask does not have one entry per coordinate.
    #[error("configuration error: decode mask has {actual} entries, expected {expected}")]
    MaskLength { expected: usize, actual: usize },
    /// Invalid connector rule (zero neighbours, bad radius, edgeless target).
    #[error("configuration error: invalid connector rule: {0}")]
    ConnectorRule(String),
    /// Cropping removed every lattice node.
    #[error(
        "configuration error: convex hull cropping of a {nx}x{ny} grid left no nodes \
         (hull has {hull_vertices} vertices, bounding box {extent_x} x {extent_y})"
    )]
    EmptyCrop {
        nx: usize,
        ny: usize,
        hull_vertices: usize,
        extent_x: f64,
        extent_y: f64,
    },
    /// Coarser-level nodes could not be matched onto finer-level nodes.
    #[error("configuration error: level {level} node {node} does not coincide with a level 0 node")]
    NestedAlignment { level: usize, node: usize },
    /// Convex hull is undefined (fewer than three non-collinear points).
    #[error(
        "degenerate geometry: convex hull needs 3 non-collinear points, \
         got {distinct} distinct point(s)"
    )]
    DegenerateGeometry { distinct: usize },
    /// A graph violates a structural invariant.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}

impl MeshGraphError {
    /// True for every invalid/incompatible sizing or option error.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            MeshGraphError::DegenerateGeometry { .. } | MeshGraphError::InvalidGraph(_)
        )
    }

    /// True when a convex hull could not be formed.
    pub fn is_degenerate_geometry(&self) -> bool {
        matches!(self, MeshGraphError::DegenerateGeometry { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_error_names_axis_and_extent() {
        let err = MeshGraphError::MeshSpacing {
            axis: Axis::X,
            extent: 1.0,
            spacing: 100.0,
            nodes: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("x extent 1"));
        assert!(msg.contains("spacing 100"));
        assert!(err.is_configuration());
    }

    #[test]
    fn degenerate_is_not_configuration() {
        let err = MeshGraphError::DegenerateGeometry { distinct: 2 };
        assert!(err.is_degenerate_geometry());
        assert!(!err.is_configuration());
    }
}
