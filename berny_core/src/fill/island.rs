// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: fill loops and islands

use crate::geometry::{polygon, Cubic};
use crate::graph::NodeData;
use crate::types::{Bounds, Vec2};

/// Orientation of a closed loop in a y-up frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

impl Winding {
    /// Orientation implied by a signed area. Zero counts as counter-clockwise.
    pub fn from_area(area: f32) -> Self {
        if area < 0.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }

    /// Contribution to a winding number: +1 counter-clockwise, -1 clockwise.
    pub fn sign(self) -> i32 {
        match self {
            Winding::Clockwise => -1,
            Winding::CounterClockwise => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Winding::Clockwise => Winding::CounterClockwise,
            Winding::CounterClockwise => Winding::Clockwise,
        }
    }
}

/// A node of a fill loop. Handles are relative to `pos`, like graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillNode {
    pub pos: Vec2,
    pub tan_in: Vec2,
    pub tan_out: Vec2,
}

impl From<NodeData> for FillNode {
    fn from(n: NodeData) -> Self {
        Self {
            pos: n.pos,
            tan_in: n.tan_in,
            tan_out: n.tan_out,
        }
    }
}

impl FillNode {
    pub fn corner(pos: Vec2) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }
}

/// A closed cyclic sequence of nodes, detached from any document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FillLoop {
    pub nodes: Vec<FillNode>,
}

impl FillLoop {
    /// Build a loop from a chain of segments. Each segment's end is taken to
    /// be the next segment's start; the last wraps to the first.
    pub fn from_cubics(cubics: &[Cubic]) -> Self {
        let n = cubics.len();
        let nodes = (0..n)
            .map(|i| {
                let seg = &cubics[i];
                let prev = &cubics[(i + n - 1) % n];
                FillNode {
                    pos: seg.p0,
                    tan_in: prev.c2 - prev.p3,
                    tan_out: seg.c1 - seg.p0,
                }
            })
            .collect();
        Self { nodes }
    }

    /// Straight-edged loop through `points`.
    pub fn from_polygon(points: &[Vec2]) -> Self {
        Self {
            nodes: points.iter().copied().map(FillNode::corner).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Segment leaving node `i`.
    pub fn segment(&self, i: usize) -> Cubic {
        let a = &self.nodes[i];
        let b = &self.nodes[(i + 1) % self.nodes.len()];
        Cubic::from_handles(a.pos, a.tan_out, b.tan_in, b.pos)
    }

    pub fn segments(&self) -> impl Iterator<Item = Cubic> + '_ {
        (0..self.nodes.len()).map(move |i| self.segment(i))
    }

    /// Exact signed area of the curved loop.
    pub fn signed_area(&self) -> f32 {
        if self.nodes.len() < 2 {
            return 0.0;
        }
        self.segments().map(|s| s.signed_area()).sum()
    }

    pub fn winding(&self) -> Winding {
        Winding::from_area(self.signed_area())
    }

    /// Same loop traversed the other way.
    pub fn reversed(&self) -> FillLoop {
        let nodes = self
            .nodes
            .iter()
            .rev()
            .map(|n| FillNode {
                pos: n.pos,
                tan_in: n.tan_out,
                tan_out: n.tan_in,
            })
            .collect();
        FillLoop { nodes }
    }

    /// Ring of points approximating the loop. The first point is not
    /// repeated at the end. With `flatten_curves` unset only node positions
    /// are emitted.
    pub fn flatten(&self, tolerance: f32, flatten_curves: bool) -> Vec<Vec2> {
        if !flatten_curves || self.nodes.len() < 2 {
            return self.nodes.iter().map(|n| n.pos).collect();
        }
        let mut out = Vec::with_capacity(self.nodes.len() * 4);
        out.push(self.nodes[0].pos);
        for seg in self.segments() {
            seg.flatten_into(tolerance, &mut out);
        }
        out.pop();
        out
    }

    /// Bounds of the control polygon.
    pub fn bounds(&self) -> Bounds {
        self.segments()
            .fold(Bounds::EMPTY, |b, s| b.union(&s.control_bounds()))
    }

    /// A point on the loop away from its nodes: the midpoint of the segment
    /// with the longest chord.
    pub fn sample_point(&self) -> Vec2 {
        self.segments()
            .max_by(|a, b| {
                let la = a.p0.distance(a.p3);
                let lb = b.p0.distance(b.p3);
                la.total_cmp(&lb)
            })
            .map(|s| s.eval(0.5))
            .unwrap_or(Vec2::ZERO)
    }

    /// Collapse consecutive nodes closer than `eps`, including across the
    /// wrap. The surviving node keeps the incoming handle of the first and
    /// the outgoing handle of the last.
    pub fn simplify(&mut self, eps: f32) {
        let mut out: Vec<FillNode> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            match out.last_mut() {
                Some(last) if last.pos.is_near(node.pos, eps) => last.tan_out = node.tan_out,
                _ => out.push(node),
            }
        }
        while out.len() > 1 {
            let last = out[out.len() - 1];
            if !last.pos.is_near(out[0].pos, eps) {
                break;
            }
            out[0].tan_in = last.tan_in;
            out.pop();
        }
        self.nodes = out;
    }
}

/// A connected filled region: one outer boundary and the holes inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct FillIsland {
    pub boundary: FillLoop,
    pub holes: Vec<FillLoop>,
    /// Orientation of `boundary`.
    pub winding: Winding,
}

impl FillIsland {
    pub fn new(boundary: FillLoop) -> Self {
        let winding = boundary.winding();
        Self {
            boundary,
            holes: Vec::new(),
            winding,
        }
    }

    /// Boundary followed by holes.
    pub fn loops(&self) -> impl Iterator<Item = &FillLoop> {
        std::iter::once(&self.boundary).chain(self.holes.iter())
    }

    pub fn node_count(&self) -> usize {
        self.loops().map(FillLoop::len).sum()
    }

    /// Unsigned filled area: outer area minus hole areas.
    pub fn area(&self) -> f32 {
        let holes: f32 = self.holes.iter().map(|h| h.signed_area().abs()).sum();
        self.boundary.signed_area().abs() - holes
    }

    pub fn bounds(&self) -> Bounds {
        self.boundary.bounds()
    }

    /// Polygonal rings of boundary and holes, with near-duplicate points
    /// removed.
    pub(crate) fn rings(&self, tolerance: f32, flatten_curves: bool, eps: f32) -> Vec<Vec<Vec2>> {
        self.loops()
            .map(|lp| {
                let mut ring = lp.flatten(tolerance, flatten_curves);
                polygon::dedup_ring(&mut ring, eps);
                ring
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> FillLoop {
        FillLoop::from_polygon(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn polygon_loop_area_and_winding() {
        let sq = unit_square();
        assert!((sq.signed_area() - 1.0).abs() < 1e-6);
        assert_eq!(sq.winding(), Winding::CounterClockwise);
        let rev = sq.reversed();
        assert!((rev.signed_area() + 1.0).abs() < 1e-6);
        assert_eq!(rev.winding(), Winding::Clockwise);
    }

    #[test]
    fn cubics_round_trip_through_nodes() {
        let a = Cubic::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.5, -0.5),
            Vec2::new(1.5, -0.5),
            Vec2::new(2.0, 0.0),
        );
        let b = Cubic::line(Vec2::new(2.0, 0.0), Vec2::new(0.0, 0.0));
        let lp = FillLoop::from_cubics(&[a, b]);
        assert_eq!(lp.len(), 2);
        assert_eq!(lp.segment(0), a);
        assert!(lp.segment(1).is_line());
        assert!(lp.signed_area() < 0.0);
    }

    #[test]
    fn simplify_merges_across_wrap() {
        let mut lp = FillLoop::from_polygon(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.00001),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 0.00001),
        ]);
        lp.simplify(1e-4);
        assert_eq!(lp.len(), 3);
    }

    #[test]
    fn flatten_without_curves_uses_nodes() {
        let sq = unit_square();
        assert_eq!(sq.flatten(0.01, false).len(), 4);
        assert_eq!(sq.flatten(0.01, true).len(), 4);
    }

    #[test]
    fn island_area_subtracts_holes() {
        let mut island = FillIsland::new(unit_square());
        let hole = FillLoop::from_polygon(&[
            Vec2::new(0.25, 0.25),
            Vec2::new(0.25, 0.75),
            Vec2::new(0.75, 0.75),
            Vec2::new(0.75, 0.25),
        ]);
        island.holes.push(hole);
        assert!((island.area() - 0.75).abs() < 1e-6);
        assert_eq!(island.node_count(), 8);
    }
}
