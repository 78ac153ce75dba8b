//! Proximity wiring of lattice meshes.
//!
//! Every surviving lattice node is connected to every surviving neighbour
//! under the chosen pattern, in both directions, so connectivity is always
//! symmetric and reverse edges carry negated displacements.

use serde::{Deserialize, Serialize};

use crate::algs::grid::LatticeMesh;
use crate::geometry::{Point, PointIndex};
use crate::mesh_error::MeshGraphError;
use crate::topology::{EdgeKind, Graph, NodeId};

/// Lattice neighbour offsets: the first four are axis-aligned, the rest diagonal.
static NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
];

/// Which node pairs become edges.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Left, right, up and down lattice neighbours.
    FourNeighbour,
    /// Axis-aligned and diagonal lattice neighbours.
    #[default]
    EightNeighbour,
    /// All node pairs within an absolute radius.
    WithinRadius(f64),
    /// All node pairs within `factor` times the larger lattice spacing, so one
    /// value fits every level of a hierarchy.
    WithinSpacings(f64),
}

impl Connectivity {
    pub fn validate(&self) -> Result<(), MeshGraphError> {
        match *self {
            Connectivity::WithinRadius(r) | Connectivity::WithinSpacings(r)
                if !(r.is_finite() && r > 0.0) =>
            {
                Err(MeshGraphError::InvalidRadius(r))
            }
            _ => Ok(()),
        }
    }
}

fn shifted(i: usize, j: usize, (di, dj): (isize, isize)) -> Option<(usize, usize)> {
    Some((i.checked_add_signed(di)?, j.checked_add_signed(dj)?))
}

/// Connect every pair of nodes of `graph` at most `radius` apart.
fn connect_within(graph: &mut Graph, radius: f64, kind: EdgeKind) -> Result<(), MeshGraphError> {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    let positions: Vec<Point> = graph.nodes().map(|n| n.pos).collect();
    let index = PointIndex::new(&positions);
    for (a, &pos) in positions.iter().enumerate() {
        for (b, _) in index.within_radius(pos, radius) {
            if a != b {
                graph.connect(ids[a], ids[b], kind)?;
            }
        }
    }
    Ok(())
}

/// Wire `lattice` into a new graph with edges of kind `Mesh { level }`.
pub fn wire_lattice(
    lattice: &LatticeMesh,
    pattern: Connectivity,
) -> Result<Graph, MeshGraphError> {
    pattern.validate()?;
    let mut graph = lattice.graph().without_edges();
    let kind = EdgeKind::Mesh {
        level: lattice.level(),
    };

    match pattern {
        Connectivity::FourNeighbour | Connectivity::EightNeighbour => {
            let offsets = if pattern == Connectivity::FourNeighbour {
                &NEIGHBOUR_OFFSETS[..4]
            } else {
                &NEIGHBOUR_OFFSETS[..]
            };
            for (i, j, id) in lattice.lattice_nodes() {
                for &offset in offsets {
                    let neighbour =
                        shifted(i, j, offset).and_then(|(ni, nj)| lattice.node_at(ni, nj));
                    if let Some(n) = neighbour {
                        graph.connect(id, n, kind)?;
                    }
                }
            }
        }
        Connectivity::WithinRadius(radius) => connect_within(&mut graph, radius, kind)?,
        Connectivity::WithinSpacings(factor) => {
            let [dx, dy] = lattice.spacing();
            connect_within(&mut graph, factor * dx.max(dy), kind)?;
        }
    }

    log::debug!(
        "level {} wired with {:?}: {} edges",
        lattice.level(),
        pattern,
        graph.num_edges()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::grid::{GridOptions, build_grid};
    use crate::geometry::points_from;
    use std::collections::HashSet;

    fn lattice(nx: usize, ny: usize) -> LatticeMesh {
        let coords = points_from([(0.0, 0.0), (nx as f64, ny as f64)]).unwrap();
        build_grid(&coords, &GridOptions::with_dims(nx, ny)).unwrap()
    }

    #[test]
    fn edge_counts_per_pattern() {
        let l = lattice(3, 2);
        // 4-neighbour: 2 * (horizontal 2*2 + vertical 3*1)
        assert_eq!(wire_lattice(&l, Connectivity::FourNeighbour).unwrap().num_edges(), 14);
        // plus 2 * 2 diagonals per cell, 2 cells
        assert_eq!(wire_lattice(&l, Connectivity::EightNeighbour).unwrap().num_edges(), 22);
        // spacing 1: radius 1.5 reaches diagonals but not two steps away
        assert_eq!(wire_lattice(&l, Connectivity::WithinRadius(1.5)).unwrap().num_edges(), 22);
        assert_eq!(wire_lattice(&l, Connectivity::WithinSpacings(1.5)).unwrap().num_edges(), 22);
    }

    #[test]
    fn absolute_radius_ignores_lattice_spacing() {
        // 5x5 lattice with spacing 2
        let coords = points_from([(0.0, 0.0), (10.0, 10.0)]).unwrap();
        let l = build_grid(&coords, &GridOptions::with_dims(5, 5)).unwrap();
        assert_eq!(l.spacing(), [2.0, 2.0]);
        let four = wire_lattice(&l, Connectivity::FourNeighbour).unwrap();
        let absolute = wire_lattice(&l, Connectivity::WithinRadius(2.0)).unwrap();
        assert_eq!(absolute.num_edges(), 80);
        let pairs = |g: &Graph| g.edges().iter().map(|e| e.endpoints()).collect::<HashSet<_>>();
        assert_eq!(pairs(&absolute), pairs(&four));
        // the same value relative to spacing reaches two lattice steps
        let relative = wire_lattice(&l, Connectivity::WithinSpacings(2.0)).unwrap();
        assert!(relative.num_edges() > absolute.num_edges());
        assert!(relative.edges().iter().all(|e| e.length <= 4.0));
    }

    #[test]
    fn wiring_is_symmetric_with_negated_vdiff() {
        let g = wire_lattice(&lattice(4, 3), Connectivity::EightNeighbour).unwrap();
        let pairs: HashSet<(NodeId, NodeId)> = g.edges().iter().map(|e| e.endpoints()).collect();
        for e in g.edges() {
            assert!(pairs.contains(&(e.target, e.source)));
            let back = g
                .edges()
                .iter()
                .find(|r| r.source == e.target && r.target == e.source)
                .unwrap();
            assert_eq!(back.vdiff, [-e.vdiff[0], -e.vdiff[1]]);
            assert_eq!(back.length, e.length);
            assert_eq!(e.kind, EdgeKind::Mesh { level: 0 });
        }
    }

    #[test]
    fn bad_radius_is_rejected() {
        let err = wire_lattice(&lattice(2, 2), Connectivity::WithinRadius(0.0)).unwrap_err();
        assert_eq!(err, MeshGraphError::InvalidRadius(0.0));
        let err = wire_lattice(&lattice(2, 2), Connectivity::WithinSpacings(f64::NAN)).unwrap_err();
        assert!(matches!(err, MeshGraphError::InvalidRadius(r) if r.is_nan()));
    }
}
