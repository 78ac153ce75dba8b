//! Top-level module for graph topology types.
//!
//! This module provides the typed graph representation shared by every
//! builder:
//! - [`NodeId`] and [`MeshNode`] for vertices
//! - [`MeshEdge`] with length/displacement attributes and a typed [`EdgeKind`]
//! - [`Graph`] for mesh graphs and [`ConnectorGraph`] for bipartite connectors
//! - [`GraphSet`] for named collections and dense export views
//!
//! Builders hand graphs to callers as read-only snapshots; combining graphs
//! always produces new values.

pub mod connector;
pub mod edge;
pub mod export;
pub mod graph;
pub mod graph_set;
pub mod node;

pub use connector::{ConnectorGraph, ConnectorRole};
pub use edge::{EdgeKind, MeshEdge};
pub use export::{BipartiteExport, GraphExport};
pub use graph::Graph;
pub use graph_set::{G2M, GraphComponent, GraphSet, M2G, M2M};
pub use node::{MeshNode, NodeId, NodeKind};

static_assertions::assert_impl_all!(Graph: Send, Sync, Clone);
static_assertions::assert_impl_all!(ConnectorGraph: Send, Sync, Clone);
static_assertions::assert_impl_all!(GraphSet: Send, Sync);
