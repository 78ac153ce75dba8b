#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-graphs
//!
//! mesh-graphs builds the graphs that graph-based weather and forecasting
//! models run on. Given a set of 2D coordinates it produces auxiliary mesh
//! graphs (a regular lattice, a flat multiscale mesh or a hierarchy of
//! lattices) and the bipartite connectors that link the original points to
//! the mesh and back.
//!
//! ## Features
//! - Regular lattice meshes with optional convex-hull cropping
//! - 4-neighbour, 8-neighbour and radius-based wiring with `length`/`vdiff` edge attributes
//! - Hierarchical meshes built by an explicit state machine with an auditable stop reason
//! - Encode/decode connectors, including decoding to a masked subset of points
//! - Archetypes (`Keisler`, `GraphCast`, `OskarssonHierarchical`) assembling `g2m`/`m2m`/`m2g`
//! - Dense export views ready for a tensor library
//!
//! ## Determinism
//!
//! Construction is pure and synchronous. Nodes are kept in ordered maps and
//! every spatial query breaks ties by distance then index, so identical
//! inputs give identical graphs. With the `rayon` feature hierarchy levels are
//! built in parallel; the result does not depend on scheduling.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mesh-graphs = "0.3"
//! # Optional features:
//! # features = ["rayon", "strict-invariants"]
//! ```
//!
//! ```
//! use mesh_graphs::prelude::*;
//!
//! let coords: Vec<(f64, f64)> = (0..10)
//!     .flat_map(|j| (0..10).map(move |i| (i as f64, j as f64)))
//!     .collect();
//! let opts = ArchetypeOptions::with_node_distance(3.0).components();
//! let graphs = Archetype::Keisler.build(&coords, &opts).unwrap();
//! let set = graphs.components().unwrap();
//! assert!(set.contains("g2m") && set.contains("m2m") && set.contains("m2g"));
//! ```

pub mod algs;
pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use mesh_error::MeshGraphError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::archetype::{
        Archetype, ArchetypeGraphs, ArchetypeOptions, MeshLayout, create_all_graph_components,
    };
    pub use crate::algs::connector::{
        ConnectionRule, MaskIndexMap, RadiusRule, connect_decode, connect_encode, mask_index_map,
    };
    pub use crate::algs::grid::{GridOptions, GridResolution, build_grid};
    pub use crate::algs::hierarchy::{
        HierarchyBuilder, HierarchyOptions, LevelSet, LevelStop, create_hierarchical_mesh,
    };
    pub use crate::algs::multiscale::{MultiscaleOptions, create_flat_multiscale_mesh};
    pub use crate::algs::proximity::{Connectivity, wire_lattice};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{Axis, BoundingBox, Point, ToPoint, points_from};
    pub use crate::mesh_error::MeshGraphError;
    pub use crate::topology::{
        ConnectorGraph, ConnectorRole, EdgeKind, Graph, GraphSet, MeshEdge, MeshNode, NodeId,
        NodeKind,
    };
}
