//! Re-export public algorithms.

pub mod archetype;
pub mod connector;
pub mod grid;
pub mod hierarchy;
pub mod multiscale;
pub mod proximity;

pub use archetype::{
    Archetype, ArchetypeGraphs, ArchetypeOptions, MeshLayout, create_all_graph_components,
};
pub use connector::{
    ConnectionRule, MaskIndexMap, RadiusRule, build_connector, connect_decode, connect_encode,
    mask_index_map,
};
pub use grid::{GridOptions, GridResolution, LatticeMesh, build_grid};
pub use hierarchy::{
    HierarchyBuilder, HierarchyOptions, HierarchyState, LevelDims, LevelSet, LevelSizing,
    LevelStop, create_hierarchical_mesh, plan_levels,
};
pub use multiscale::{FlatMultiscaleMesh, MultiscaleOptions, create_flat_multiscale_mesh};
pub use proximity::{Connectivity, wire_lattice};
