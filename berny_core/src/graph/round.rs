// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: corner rounding
//!
//! A corner node is moved back along its incoming edge and a new node is
//! inserted along its outgoing edge. The two are joined by a single cubic
//! approximating a circular arc that is tangent to both edges.

use super::{Document, LoopId, NodeData, NodeId, ShapeId};
use crate::error::PathError;
use crate::types::Vec2;
use std::f32::consts::PI;

/// Corners flatter or sharper than this (radians) are left alone.
const MIN_CORNER_ANGLE: f32 = 1e-3;

/// How large a fillet to cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundAmount {
    /// Fillet radius in document units.
    Radius(f32),
    /// Distance from the corner to each new node, as a fraction of the
    /// shorter adjacent edge (clamped to `0..=0.5`).
    Fraction(f32),
}

impl Default for RoundAmount {
    fn default() -> Self {
        RoundAmount::Fraction(0.25)
    }
}

impl Document {
    /// Replace the corner at `id` with a tangent-continuous fillet.
    ///
    /// Returns the node inserted after `id`, or `None` when there is no
    /// corner to round (open path end, straight or cusp-like joint,
    /// degenerate edges). The setback along each edge never exceeds half
    /// of that edge, so adjacent fillets cannot overlap.
    pub fn round_node(&mut self, id: NodeId, amount: RoundAmount) -> Result<Option<NodeId>, PathError> {
        let node = self.node(id)?;
        let (Some(prev), Some(_next)) = (node.prev, node.next) else {
            return Ok(None);
        };
        if prev == id {
            return Ok(None);
        }
        let corner = node.pos;
        let (Some(seg_in), Some(seg_out)) = (self.segment(prev)?, self.segment(id)?) else {
            return Ok(None);
        };

        let u_prev = -seg_in.tangent(1.0);
        let u_next = seg_out.tangent(0.0);
        if u_prev == Vec2::ZERO || u_next == Vec2::ZERO {
            return Ok(None);
        }
        let theta = u_prev.dot(u_next).clamp(-1.0, 1.0).acos();
        if theta < MIN_CORNER_ANGLE || theta > PI - MIN_CORNER_ANGLE {
            return Ok(None);
        }

        let len_in = seg_in.p0.distance(corner);
        let len_out = corner.distance(seg_out.p3);
        let max_setback = 0.5 * len_in.min(len_out);
        if max_setback <= f32::EPSILON {
            return Ok(None);
        }
        let half_tan = (theta * 0.5).tan();
        let setback = match amount {
            RoundAmount::Radius(r) => r.max(0.0) / half_tan,
            RoundAmount::Fraction(f) => f.clamp(0.0, 0.5) * len_in.min(len_out),
        }
        .min(max_setback);
        if setback <= f32::EPSILON {
            return Ok(None);
        }
        let radius = setback * half_tan;
        let turn = PI - theta;
        let handle = 4.0 / 3.0 * (turn / 4.0).tan() * radius;

        let a = corner + u_prev * setback;
        let b = corner + u_next * setback;

        // Trim the neighbouring segments so they end on the new nodes.
        let (prev_tan_out, a_tan_in) = if seg_in.is_line() {
            (seg_in.c1 - seg_in.p0, Vec2::ZERO)
        } else {
            let (_, t) = seg_in.closest_point(a);
            let sub = seg_in.subsection(0.0, t);
            (sub.c1 - sub.p0, sub.c2 - a)
        };
        let (b_tan_out, next_tan_in) = if seg_out.is_line() {
            (Vec2::ZERO, seg_out.c2 - seg_out.p3)
        } else {
            let (_, t) = seg_out.closest_point(b);
            let sub = seg_out.subsection(t, 1.0);
            (sub.c1 - b, sub.c2 - sub.p3)
        };

        let next = self.node(id)?.next.ok_or(PathError::UnknownNode(id))?;
        self.nodes[prev.index()].tan_out = prev_tan_out;
        self.nodes[next.index()].tan_in = next_tan_in;
        {
            let n = &mut self.nodes[id.index()];
            n.pos = a;
            n.tan_in = a_tan_in;
            n.tan_out = -u_prev * handle;
        }
        let inserted = self.insert_after(
            id,
            NodeData::smooth(b, -u_next * handle, b_tan_out),
        )?;
        log::trace!("rounded {:?} with radius {}", id, radius);
        Ok(Some(inserted))
    }

    /// Round every corner of a loop. Returns how many corners changed.
    pub fn round_loop(&mut self, id: LoopId, amount: RoundAmount) -> Result<usize, PathError> {
        let mut rounded = 0;
        for nid in self.loop_nodes(id)? {
            if self.round_node(nid, amount)?.is_some() {
                rounded += 1;
            }
        }
        Ok(rounded)
    }

    /// Round every corner of every loop in a shape.
    pub fn round_shape(&mut self, id: ShapeId, amount: RoundAmount) -> Result<usize, PathError> {
        let loops = self.shape(id)?.loops.clone();
        let mut rounded = 0;
        for lid in loops {
            rounded += self.round_loop(lid, amount)?;
        }
        Ok(rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon;

    #[test]
    fn rounding_a_square_corner() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let lid = doc.shape(shape).unwrap().loops()[0];
        let start = doc.get_loop(lid).unwrap().start();

        let inserted = doc.round_node(start, RoundAmount::Radius(0.2)).unwrap().unwrap();
        assert_eq!(doc.get_loop(lid).unwrap().node_count(), 5);
        assert!(doc.node(start).unwrap().pos().is_near(Vec2::new(0.0, 0.2), 1e-6));
        assert!(doc.node(inserted).unwrap().pos().is_near(Vec2::new(0.2, 0.0), 1e-6));

        // The arc is tangent to both edges and passes at radius 0.2 from the
        // fillet center.
        let arc = doc.segment(start).unwrap().unwrap();
        assert!(arc.tangent(0.0).is_near(Vec2::new(0.0, -1.0), 1e-5));
        assert!(arc.tangent(1.0).is_near(Vec2::new(1.0, 0.0), 1e-5));
        let mid = arc.eval(0.5);
        assert!((mid.distance(Vec2::new(0.2, 0.2)) - 0.2).abs() < 1e-3);
    }

    #[test]
    fn rounding_all_corners_keeps_cyclic_order() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let r = 0.2;
        assert_eq!(doc.round_shape(shape, RoundAmount::Radius(r)).unwrap(), 4);
        doc.flush_dirty().unwrap();

        let lid = doc.shape(shape).unwrap().loops()[0];
        let nodes = doc.loop_nodes(lid).unwrap();
        assert_eq!(nodes.len(), 8);
        let ring: Vec<Vec2> = nodes.iter().map(|n| doc.node(*n).unwrap().pos()).collect();
        assert!(polygon::is_convex(&ring));

        let expected = 1.0 - (4.0 - PI) * r * r;
        let area = doc.get_loop(lid).unwrap().cache().signed_area;
        assert!((area - expected).abs() < 1e-3, "area {} vs {}", area, expected);
    }

    #[test]
    fn radius_is_clamped_to_half_edges() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let lid = doc.shape(shape).unwrap().loops()[0];
        let start = doc.get_loop(lid).unwrap().start();
        let inserted = doc.round_node(start, RoundAmount::Radius(5.0)).unwrap().unwrap();
        assert!(doc.node(start).unwrap().pos().is_near(Vec2::new(0.0, 0.5), 1e-6));
        assert!(doc.node(inserted).unwrap().pos().is_near(Vec2::new(0.5, 0.0), 1e-6));
    }

    #[test]
    fn straight_and_open_nodes_are_skipped() {
        let mut doc = Document::new();
        let shape = doc.add_polygon(
            &[
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(2.0, 1.0),
            ],
            false,
        );
        let lid = doc.shape(shape).unwrap().loops()[0];
        let nodes = doc.loop_nodes(lid).unwrap();
        assert!(doc.round_node(nodes[0], RoundAmount::default()).unwrap().is_none());
        assert!(doc.round_node(nodes[1], RoundAmount::default()).unwrap().is_none());
        assert!(doc.round_node(nodes[2], RoundAmount::default()).unwrap().is_some());
        assert!(doc.round_node(nodes[3], RoundAmount::default()).unwrap().is_none());
        assert_eq!(doc.loop_nodes(lid).unwrap().len(), 5);
    }
}
