// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
use berny_core::fill::{FillLoop, FillSession, Vector2Repo, Winding, WindingRequirement};
use berny_core::geometry::{closest_point_distance, polygon};
use berny_core::graph::{Document, NodeData, RoundAmount, ShapeId};
use berny_core::loader::json;
use berny_core::mesh::{self, FillType};
use berny_core::types::Vec2;
use berny_core::FillOptions;
use std::f32::consts::PI;
mod testutil;

const RADIUS: f32 = 0.25;

fn rounded_square() -> (Document, ShapeId) {
    let mut doc = Document::new();
    let shape = doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
    let lid = doc.shape(shape).unwrap().loops()[0];
    for node in doc.loop_nodes(lid).unwrap() {
        doc.round_node(node, RoundAmount::Radius(RADIUS)).unwrap();
    }
    doc.flush_dirty().unwrap();
    (doc, shape)
}

fn ring_of(lp: &FillLoop) -> Vec<Vec2> {
    lp.nodes.iter().map(|n| n.pos).collect()
}

#[test]
fn rounded_square_fill() {
    let (doc, shape) = rounded_square();
    let mut session = FillSession::new();
    assert_eq!(session.extract_fill_loops(&doc, shape).unwrap(), 1);

    let island = &session.islands[0];
    assert!(island.holes.is_empty());
    assert_eq!(island.boundary.len(), 8);
    assert_eq!(island.winding, Winding::CounterClockwise);
    assert!(polygon::is_convex(&ring_of(&island.boundary)));

    let expected = 1.0 - (4.0 - PI) * RADIUS * RADIUS;
    assert!((island.area() - expected).abs() < 1e-3, "{} vs {}", island.area(), expected);

    let mut repo = Vector2Repo::new();
    let mut indices = Vec::new();
    session.get_triangles(&mut indices, &mut repo, true, WindingRequirement::Clockwise, true);
    let covered = testutil::mesh_area(repo.positions(), &indices);
    assert!((covered - expected).abs() < 2e-3, "{} vs {}", covered, expected);
    for area in testutil::triangle_areas(repo.positions(), &indices) {
        assert!(area < 0.0);
    }
}

#[test]
fn rounded_square_outline() {
    // Up to twice the corner radius the inner offset keeps its rounded corners.
    for width in [0.05, 0.45] {
        let (doc, shape) = rounded_square();
        let mut session = FillSession::new();
        session.extract_fill_loops(&doc, shape).unwrap();
        session.make_outline_bridged(width);

        assert_eq!(session.islands.len(), 1, "width {}", width);
        let ribbon = &session.islands[0];
        assert!(ribbon.holes.is_empty());
        let ring = ring_of(&ribbon.boundary);
        assert!(polygon::is_simple(&ring), "width {}", width);

        let perimeter = 4.0 * (1.0 - 2.0 * RADIUS) + 2.0 * PI * RADIUS;
        let expected = perimeter * width;
        let area = ribbon.area();
        assert!((area - expected).abs() < expected * 0.01, "{} vs {}", area, expected);
    }
}

#[test]
fn fill_and_outline_from_one_extraction() {
    let (doc, shape) = rounded_square();
    let mesh = mesh::tessellate(
        &doc,
        shape,
        FillType::FilledAndOutlined { width: 0.05 },
        &FillOptions::default(),
    )
    .unwrap();
    assert_eq!(mesh.submeshes.len(), 2);
    assert!(mesh.warnings.is_empty());
    let positions: Vec<Vec2> = mesh.vertices.iter().map(|v| Vec2::new(v.x, v.y)).collect();
    let fill = &mesh.indices[mesh.submeshes[0].clone()];
    let outline = &mesh.indices[mesh.submeshes[1].clone()];
    let fill_area = testutil::mesh_area(&positions, fill);
    let outline_area = testutil::mesh_area(&positions, outline);
    assert!((fill_area - (1.0 - (4.0 - PI) * RADIUS * RADIUS)).abs() < 2e-3);
    assert!(outline_area > 0.15 && outline_area < 0.2, "outline area {}", outline_area);
}

#[test]
fn figure_eight_gives_opposite_islands() {
    let mut doc = Document::new();
    let shape = doc.add_polygon(
        &[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
        ],
        true,
    );
    let mut session = FillSession::new();
    assert_eq!(session.extract_fill_loops(&doc, shape).unwrap(), 2);
    let a = session.islands[0].winding;
    let b = session.islands[1].winding;
    assert_eq!(a, b.opposite());
    for island in &session.islands {
        assert!((island.area() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn crossing_curves_give_opposite_islands() {
    // Two S-shaped cubics between the same end points, crossing at the middle.
    for scale in [1.0, 100.0, 1000.0] {
        let s = |x: f32, y: f32| Vec2::new(x * scale, y * scale);
        let mut doc = Document::new();
        let shape = doc.add_shape();
        let nodes = [
            NodeData::smooth(s(0.0, 0.0), s(2.0, -3.0), s(2.0, 3.0)),
            NodeData::smooth(s(4.0, 0.0), s(-2.0, -3.0), s(-2.0, 3.0)),
        ];
        doc.add_loop(shape, &nodes, true).unwrap();

        let mut session = FillSession::new();
        assert_eq!(session.extract_fill_loops(&doc, shape).unwrap(), 2, "scale {}", scale);
        assert!(session.warnings().is_empty(), "scale {}", scale);
        let (a, b) = (&session.islands[0], &session.islands[1]);
        assert_eq!(a.winding, b.winding.opposite());
        assert!((a.area() - b.area()).abs() < 1e-3 * a.area());
        for island in &session.islands {
            assert!(island
                .boundary
                .nodes
                .iter()
                .any(|n| n.pos.is_near(s(2.0, 0.0), 1e-3 * scale)));
        }
    }
}

#[test]
fn clones_are_deep_copies() {
    let (doc, shape) = rounded_square();
    let mut original = FillSession::new();
    original.extract_fill_loops(&doc, shape).unwrap();
    let mut copy = original.clone();

    copy.islands[0].boundary.nodes[0].pos = Vec2::new(9.0, 9.0);
    assert!(!original.islands[0].boundary.nodes[0].pos.is_near(Vec2::new(9.0, 9.0), 1e-6));

    original.make_outline_bridged(0.1);
    assert_eq!(copy.islands[0].boundary.len(), 8);
}

#[test]
fn glyph_with_counter_has_a_hole() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../tests/data/glyphs.json");
    let face = json::typeface_from_reader(std::fs::File::open(path).unwrap()).unwrap();
    let o = face.glyph("O").unwrap();

    let mut doc = Document::new();
    let shape = doc.add_glyph(o, Vec2::ZERO);
    let mut session = FillSession::new();
    session.extract_fill_loops(&doc, shape).unwrap();
    assert_eq!(session.islands.len(), 1);
    assert_eq!(session.islands[0].holes.len(), 1);

    let crossed = face.layout(&["X"], Vec2::ZERO);
    let mesh = mesh::tessellate_loops(crossed, FillType::Filled, &FillOptions::default());
    assert_eq!(mesh.submeshes.len(), 1);
    assert!(mesh.triangle_count() >= 2);
}

#[test]
fn closest_point_on_straight_cubic() {
    let (dist, t) = closest_point_distance(
        Vec2::new(0.0, 2.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 0.0),
    );
    assert!((dist - 2.0).abs() < 1e-6);
    assert_eq!(t, 0.0);
}
