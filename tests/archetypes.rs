mod util;

use mesh_graphs::algs::archetype::{
    Archetype, ArchetypeGraphs, ArchetypeOptions, MeshLayout, create_all_graph_components,
};
use mesh_graphs::algs::connector::{ConnectionRule, RadiusRule};
use mesh_graphs::debug_invariants::DebugInvariants;
use mesh_graphs::geometry::{convex_hull, points_from};
use mesh_graphs::mesh_error::MeshGraphError;
use mesh_graphs::topology::{EdgeKind, G2M, Graph, M2G, M2M, NodeKind};
use util::{circle, fake_xy, integer_square};

#[test]
fn every_archetype_builds_the_triad() {
    let xy = points_from(integer_square(28)).unwrap();
    let opts = ArchetypeOptions::with_node_distance(3.0).components();
    for archetype in Archetype::ALL {
        let set = archetype.build_from(&xy, &opts).unwrap().into_components().unwrap();
        for name in [G2M, M2M, M2G] {
            assert!(set.contains(name), "{archetype:?} lacks {name}");
        }
        let g2m = set.connector(G2M).unwrap();
        assert_eq!(g2m.num_data_nodes(), xy.len());
        assert!(g2m.num_edges() > 0);
        assert_eq!(set.connector(M2G).unwrap().num_edges(), xy.len() * 4);
    }
}

#[test]
fn cropped_archetypes_keep_only_mesh_nodes_inside_the_hull() {
    let xy = circle(200, 40.0);
    let hull = convex_hull(&xy).unwrap();
    let full_opts = ArchetypeOptions::with_node_distance(3.0).components();
    let crop_opts = ArchetypeOptions {
        crop_to_convex_hull: true,
        ..full_opts.clone()
    };
    for archetype in Archetype::ALL {
        let build = |opts: &ArchetypeOptions| {
            archetype
                .build_from(&xy, opts)
                .unwrap()
                .into_components()
                .unwrap()
        };
        let (full, cropped) = (build(&full_opts), build(&crop_opts));

        let m2m = cropped.mesh(M2M).unwrap();
        assert!(m2m.num_nodes() < full.mesh(M2M).unwrap().num_nodes(), "{archetype:?}");
        assert!(m2m.validate_invariants().is_ok());
        assert!(m2m.nodes().all(|n| hull.contains(n.pos)));
        assert!(
            m2m.edges()
                .iter()
                .all(|e| m2m.contains_node(e.source) && m2m.contains_node(e.target))
        );

        for name in [G2M, M2G] {
            let c = cropped.connector(name).unwrap();
            assert!(c.validate_invariants().is_ok());
            assert_eq!(c.num_data_nodes(), xy.len());
            assert!(c.num_mesh_nodes() < full.connector(name).unwrap().num_mesh_nodes());
        }
        assert_eq!(cropped.connector(M2G).unwrap().num_edges(), xy.len() * 4);
    }

    let hierarchy = Archetype::OskarssonHierarchical
        .build_from(&xy, &crop_opts)
        .unwrap()
        .into_components()
        .unwrap();
    let level0 = hierarchy.mesh("m2m_level_0").unwrap();
    let up = hierarchy.mesh("m2m_up_0_1").unwrap();
    assert_eq!(up.num_edges(), level0.num_nodes());
    assert!(up.edges().iter().all(|e| level0.contains_node(e.source)));
}

#[test]
fn graphcast_mesh_has_long_range_edges_on_level_zero_nodes() {
    let xy = points_from(integer_square(28)).unwrap();
    let opts = ArchetypeOptions::with_node_distance(3.0).components();
    let set = Archetype::GraphCast
        .build_from(&xy, &opts)
        .unwrap()
        .into_components()
        .unwrap();
    let m2m = set.mesh(M2M).unwrap();
    assert_eq!(m2m.num_nodes(), 81);
    assert!(m2m.edges().iter().any(|e| e.kind == EdgeKind::Mesh { level: 1 }));
    // connectors are sized by the finest edges only
    let g2m = set.connector(G2M).unwrap();
    assert!(g2m.edges().iter().all(|e| e.length <= 0.51 * 3.0 * 2f64.sqrt() + 1e-9));
}

#[test]
fn merged_graph_uses_data_then_mesh_ids() {
    let xy = fake_xy(10, 10);
    // 10x10 and 3x3 levels
    let merged = Archetype::OskarssonHierarchical
        .build_from(&xy, &ArchetypeOptions::with_node_distance(1.0))
        .unwrap()
        .into_merged()
        .unwrap();
    assert!(merged.has_contiguous_ids());
    for n in merged.nodes() {
        match n.kind {
            NodeKind::Data => assert!(n.id.get() < 100),
            NodeKind::Mesh => assert!(n.id.get() >= 100),
        }
    }
    let kinds: Vec<&str> = merged.edges().iter().map(|e| e.kind.direction()).collect();
    for dir in ["g2m", "same", "up", "down", "m2g"] {
        assert!(kinds.contains(&dir), "no {dir} edges");
    }
    let parts = merged.split_by_edge(|e| e.kind.direction());
    assert!(parts["g2m"].edges().iter().all(|e| e.source.get() < 100));
    assert!(parts["m2g"].edges().iter().all(|e| e.target.get() < 100));
}

#[test]
fn positions_of_any_numeric_type_give_identical_graphs() {
    let opts = ArchetypeOptions::with_node_distance(3.0);
    let as_f64: Vec<(f64, f64)> = integer_square(10);
    let as_f32: Vec<[f32; 2]> = as_f64.iter().map(|&(x, y)| [x as f32, y as f32]).collect();
    let as_i64: Vec<Vec<i64>> = as_f64.iter().map(|&(x, y)| vec![x as i64, y as i64]).collect();
    let as_u8: Vec<(u8, u8)> = as_f64.iter().map(|&(x, y)| (x as u8, y as u8)).collect();

    let reference = Archetype::Keisler.build(&as_f64, &opts).unwrap();
    assert_eq!(Archetype::Keisler.build(&as_f32, &opts).unwrap(), reference);
    assert_eq!(Archetype::Keisler.build(&as_i64, &opts).unwrap(), reference);
    assert_eq!(Archetype::Keisler.build(as_u8, &opts).unwrap(), reference);
}

#[test]
fn malformed_coordinates_are_configuration_errors() {
    let opts = ArchetypeOptions::default();
    let three = vec![vec![0.0, 0.0], vec![1.0, 1.0, 1.0]];
    let err = Archetype::Keisler.build(&three, &opts).unwrap_err();
    assert!(matches!(err, MeshGraphError::InvalidCoordinate { index: 1, .. }));

    let nan = [(0.0, 0.0), (f64::NAN, 1.0)];
    let err = Archetype::Keisler.build(nan, &opts).unwrap_err();
    assert!(matches!(err, MeshGraphError::InvalidCoordinate { index: 1, .. }));
    assert!(err.is_configuration());

    let empty: Vec<(f64, f64)> = Vec::new();
    assert_eq!(
        Archetype::Keisler.build(&empty, &opts).unwrap_err(),
        MeshGraphError::EmptyCoordinates
    );
}

#[test]
fn generic_entry_point_accepts_custom_rules() {
    let xy = fake_xy(10, 10);
    let opts = ArchetypeOptions {
        g2m_rule: ConnectionRule::Nearest,
        m2g_rule: ConnectionRule::WithinRadius(RadiusRule::Absolute(2.0)),
        return_components: true,
        ..ArchetypeOptions::with_node_distance(2.5)
    };
    let out = create_all_graph_components(&xy, MeshLayout::SingleScale, &opts).unwrap();
    let set = out.components().unwrap();
    assert_eq!(set.connector(G2M).unwrap().num_edges(), 100);
    assert!(set.connector(M2G).unwrap().edges().iter().all(|e| e.length <= 2.0));
}

#[test]
fn export_views_are_dense() {
    let xy = fake_xy(6, 6);
    let graphs = Archetype::Keisler
        .build_from(&xy, &ArchetypeOptions::with_node_distance(2.0).components())
        .unwrap();
    let set = graphs.components().unwrap();
    let m2m = set.mesh(M2M).unwrap().to_export().unwrap();
    let n = m2m.node_ids.len();
    assert!(m2m.edge_index.iter().flatten().all(|&i| i < n));
    assert_eq!(m2m.positions_flat().len(), 2 * n);
    assert_eq!(m2m.vdiffs_flat().len(), 2 * m2m.lengths.len());

    let g2m = set.connector(G2M).unwrap().to_export().unwrap();
    assert!(g2m.edge_index[0].iter().all(|&d| d < g2m.data_positions.len()));
    assert!(g2m.edge_index[1].iter().all(|&m| m < g2m.mesh_positions.len()));
}

#[test]
fn graphs_round_trip_through_json() {
    let xy = fake_xy(6, 6);
    let merged = Archetype::Keisler
        .build_from(&xy, &ArchetypeOptions::with_node_distance(2.0))
        .unwrap();
    let ArchetypeGraphs::Merged(graph) = merged else {
        panic!("expected a merged graph");
    };
    let json = serde_json::to_string(&graph).unwrap();
    let back: Graph = serde_json::from_str(&json).unwrap();
    assert_eq!(back.node_ids().collect::<Vec<_>>(), graph.node_ids().collect::<Vec<_>>());
    let shape = |g: &Graph| g.edges().iter().map(|e| (e.endpoints(), e.kind)).collect::<Vec<_>>();
    assert_eq!(shape(&back), shape(&graph));
}
