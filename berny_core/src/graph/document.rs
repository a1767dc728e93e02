// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: document arena and change tracking

use super::{Layer, LayerId, Loop, LoopCache, LoopId, Node, NodeData, NodeId, Shape, ShapeId};
use crate::error::PathError;
use crate::font::Glyph;
use crate::geometry::Cubic;
use crate::types::{Bounds, Vec2};
use std::collections::BTreeSet;

/// Handle length for a quarter circle drawn with one cubic.
pub const KAPPA: f32 = 0.552_284_8;

/// Flattening tolerance used for cached arc lengths and bounds.
const CACHE_TOLERANCE: f32 = 1e-3;

/// What a [`Document::flush_dirty`] call recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub loops: Vec<LoopId>,
    pub shapes: Vec<ShapeId>,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

/// Nearest segment found by [`Document::closest_segment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Node whose outgoing segment was hit.
    pub node: NodeId,
    pub distance: f32,
    /// Curve parameter of the nearest point.
    pub t: f32,
}

/// Root of the path graph. Owns every layer, shape, loop and node in
/// index-addressed arenas.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) loops: Vec<Loop>,
    pub(crate) shapes: Vec<Shape>,
    pub(crate) layers: Vec<Layer>,
    active_layer: Option<LayerId>,
    revision: u64,
    changes: BTreeSet<LoopId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------
    // Lookup

    pub fn node(&self, id: NodeId) -> Result<&Node, PathError> {
        self.nodes.get(id.index()).ok_or(PathError::UnknownNode(id))
    }

    pub fn get_loop(&self, id: LoopId) -> Result<&Loop, PathError> {
        self.loops.get(id.index()).ok_or(PathError::UnknownLoop(id))
    }

    pub fn shape(&self, id: ShapeId) -> Result<&Shape, PathError> {
        self.shapes.get(id.index()).ok_or(PathError::UnknownShape(id))
    }

    pub fn layer(&self, id: LayerId) -> Result<&Layer, PathError> {
        self.layers.get(id.index()).ok_or(PathError::UnknownLayer(id))
    }

    /// All layers in z-order.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> + '_ {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, l)| (LayerId(i as u32), l))
    }

    /// Every shape, layer by layer.
    pub fn shapes(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.layers.iter().flat_map(|l| l.shapes.iter().copied())
    }

    /// Every node in the document.
    pub fn enumerate_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Nodes of a loop in order, starting at the loop's start node.
    ///
    /// The chain is walked for exactly `node_count` steps and its links are
    /// checked along the way; a chain that does not match the loop's
    /// recorded shape fails with [`PathError::InvalidTopology`].
    pub fn loop_nodes(&self, id: LoopId) -> Result<Vec<NodeId>, PathError> {
        let lp = self.get_loop(id)?;
        let topology = |reason: String| PathError::InvalidTopology {
            loop_id: id,
            reason,
        };
        let mut out: Vec<NodeId> = Vec::with_capacity(lp.count);
        if lp.count == 0 {
            return Ok(out);
        }
        let mut cur = Some(lp.start);
        for step in 0..lp.count {
            let nid = cur.ok_or_else(|| {
                topology(format!("chain ends after {} of {} nodes", step, lp.count))
            })?;
            let node = self
                .nodes
                .get(nid.index())
                .ok_or_else(|| topology(format!("link to missing node {:?}", nid)))?;
            if node.owner != id {
                return Err(topology(format!("node {:?} belongs to {:?}", nid, node.owner)));
            }
            if let Some(&before) = out.last() {
                if node.prev != Some(before) {
                    return Err(topology(format!("node {:?} has a broken prev link", nid)));
                }
            }
            out.push(nid);
            cur = node.next;
        }
        let first = self.nodes[lp.start.index()].prev;
        if lp.closed {
            if cur != Some(lp.start) {
                return Err(topology(format!(
                    "closed loop does not return to its start after {} nodes",
                    lp.count
                )));
            }
            if first != out.last().copied() {
                return Err(topology("start node prev link does not close the loop".into()));
            }
        } else if cur.is_some() || first.is_some() {
            return Err(topology("open loop has links past its end points".into()));
        }
        Ok(out)
    }

    /// Segment leaving `id`, or `None` at the end of an open path.
    pub fn segment(&self, id: NodeId) -> Result<Option<Cubic>, PathError> {
        let node = self.node(id)?;
        match node.next {
            None => Ok(None),
            Some(next) => {
                let next = self.node(next)?;
                Ok(Some(Cubic::from_handles(
                    node.pos,
                    node.tan_out,
                    next.tan_in,
                    next.pos,
                )))
            }
        }
    }

    /// Segments of a loop in order. Open loops yield one fewer segment than
    /// nodes.
    pub fn loop_segments(&self, id: LoopId) -> Result<Vec<Cubic>, PathError> {
        let nodes = self.loop_nodes(id)?;
        let mut out = Vec::with_capacity(nodes.len());
        for nid in nodes {
            if let Some(seg) = self.segment(nid)? {
                out.push(seg);
            }
        }
        Ok(out)
    }

    /// Segment nearest to `query` over the whole document.
    pub fn closest_segment(&self, query: Vec2) -> Option<SegmentHit> {
        let mut best: Option<SegmentHit> = None;
        for (id, node) in self.enumerate_nodes() {
            let Some(next) = node.next.and_then(|n| self.nodes.get(n.index())) else {
                continue;
            };
            let seg = Cubic::from_handles(node.pos, node.tan_out, next.tan_in, next.pos);
            let (distance, t) = seg.closest_point(query);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(SegmentHit {
                    node: id,
                    distance,
                    t,
                });
            }
        }
        best
    }

    // ---------------------------------------------------------------
    // Construction

    /// Create a layer and make it the target for new shapes.
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let id = LayerId(self.layers.len() as u32);
        self.layers.push(Layer {
            name: name.to_string(),
            shapes: Vec::new(),
        });
        self.active_layer = Some(id);
        id
    }

    /// Layer new shapes are added to, created on first use.
    pub fn active_layer(&mut self) -> LayerId {
        match self.active_layer {
            Some(id) => id,
            None => self.add_layer("Layer"),
        }
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> Result<(), PathError> {
        self.layer(id)?;
        self.active_layer = Some(id);
        Ok(())
    }

    /// Empty shape on the active layer.
    pub fn add_shape(&mut self) -> ShapeId {
        let layer = self.active_layer();
        let id = ShapeId(self.shapes.len() as u32);
        self.shapes.push(Shape {
            layer,
            loops: Vec::new(),
            bounds: Bounds::EMPTY,
        });
        self.layers[layer.index()].shapes.push(id);
        id
    }

    /// Append a loop built from `nodes` to a shape.
    pub fn add_loop(
        &mut self,
        shape: ShapeId,
        nodes: &[NodeData],
        closed: bool,
    ) -> Result<LoopId, PathError> {
        self.shape(shape)?;
        let id = LoopId(self.loops.len() as u32);
        let base = self.nodes.len() as u32;
        let count = nodes.len() as u32;
        for (i, data) in nodes.iter().enumerate() {
            let i = i as u32;
            let next = if i + 1 < count {
                Some(NodeId(base + i + 1))
            } else if closed {
                Some(NodeId(base))
            } else {
                None
            };
            let prev = if i > 0 {
                Some(NodeId(base + i - 1))
            } else if closed {
                Some(NodeId(base + count - 1))
            } else {
                None
            };
            self.nodes.push(Node {
                pos: data.pos,
                tan_in: data.tan_in,
                tan_out: data.tan_out,
                next,
                prev,
                owner: id,
            });
        }
        self.loops.push(Loop {
            start: NodeId(base),
            count: nodes.len(),
            closed,
            shape,
            edit_revision: 0,
            cache: LoopCache::default(),
        });
        self.shapes[shape.index()].loops.push(id);
        self.mark_dirty(id);
        Ok(id)
    }

    /// Axis aligned rectangle between two corners, counter-clockwise.
    pub fn add_rectangle(&mut self, a: Vec2, b: Vec2) -> ShapeId {
        let min = Vec2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vec2::new(a.x.max(b.x), a.y.max(b.y));
        let corners = [
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
            Vec2::new(min.x, max.y),
        ];
        self.add_polygon(&corners, true)
    }

    /// Ellipse approximated with four cubic arcs, counter-clockwise.
    pub fn add_ellipse(&mut self, center: Vec2, radii: Vec2) -> ShapeId {
        let kx = radii.x * KAPPA;
        let ky = radii.y * KAPPA;
        let nodes = [
            NodeData::smooth(
                center + Vec2::new(radii.x, 0.0),
                Vec2::new(0.0, -ky),
                Vec2::new(0.0, ky),
            ),
            NodeData::smooth(
                center + Vec2::new(0.0, radii.y),
                Vec2::new(kx, 0.0),
                Vec2::new(-kx, 0.0),
            ),
            NodeData::smooth(
                center + Vec2::new(-radii.x, 0.0),
                Vec2::new(0.0, ky),
                Vec2::new(0.0, -ky),
            ),
            NodeData::smooth(
                center + Vec2::new(0.0, -radii.y),
                Vec2::new(-kx, 0.0),
                Vec2::new(kx, 0.0),
            ),
        ];
        let shape = self.add_shape();
        // The shape was just created, so the lookup cannot fail.
        let _ = self.add_loop(shape, &nodes, true);
        shape
    }

    /// Polygon through `points` with sharp corners.
    pub fn add_polygon(&mut self, points: &[Vec2], closed: bool) -> ShapeId {
        let nodes: Vec<NodeData> = points.iter().copied().map(NodeData::corner).collect();
        let shape = self.add_shape();
        let _ = self.add_loop(shape, &nodes, closed);
        shape
    }

    /// One shape holding a loop per glyph contour.
    pub fn add_glyph(&mut self, glyph: &Glyph, offset: Vec2) -> ShapeId {
        let shape = self.add_shape();
        for contour in glyph.node_loops(offset) {
            let _ = self.add_loop(shape, &contour, true);
        }
        shape
    }

    // ---------------------------------------------------------------
    // Editing

    pub fn set_node_position(&mut self, id: NodeId, pos: Vec2) -> Result<(), PathError> {
        let owner = self.node(id)?.owner;
        self.nodes[id.index()].pos = pos;
        self.mark_dirty(owner);
        Ok(())
    }

    pub fn set_node_tangents(
        &mut self,
        id: NodeId,
        tan_in: Vec2,
        tan_out: Vec2,
    ) -> Result<(), PathError> {
        let owner = self.node(id)?.owner;
        let node = &mut self.nodes[id.index()];
        node.tan_in = tan_in;
        node.tan_out = tan_out;
        self.mark_dirty(owner);
        Ok(())
    }

    /// Insert a node on the segment leaving `id` at parameter `t` without
    /// changing the curve's shape. Returns `None` for open path ends.
    pub fn split_segment(&mut self, id: NodeId, t: f32) -> Result<Option<NodeId>, PathError> {
        let Some(seg) = self.segment(id)? else {
            return Ok(None);
        };
        let t = t.clamp(0.0, 1.0);
        let (left, right) = seg.split(t);
        let next = self.node(id)?.next.ok_or(PathError::UnknownNode(id))?;
        self.nodes[id.index()].tan_out = left.c1 - left.p0;
        self.nodes[next.index()].tan_in = right.c2 - right.p3;
        let inserted = self.insert_after(
            id,
            NodeData::smooth(left.p3, left.c2 - left.p3, right.c1 - right.p0),
        )?;
        Ok(Some(inserted))
    }

    /// Link a new node directly after `id` in the same loop.
    pub(crate) fn insert_after(&mut self, id: NodeId, data: NodeData) -> Result<NodeId, PathError> {
        let node = self.node(id)?;
        let owner = node.owner;
        let old_next = node.next;
        let new_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            pos: data.pos,
            tan_in: data.tan_in,
            tan_out: data.tan_out,
            next: old_next,
            prev: Some(id),
            owner,
        });
        self.nodes[id.index()].next = Some(new_id);
        if let Some(n) = old_next {
            self.nodes[n.index()].prev = Some(new_id);
        }
        self.loops[owner.index()].count += 1;
        self.mark_dirty(owner);
        Ok(new_id)
    }

    // ---------------------------------------------------------------
    // Change tracking

    /// Record an edit to a loop.
    pub(crate) fn mark_dirty(&mut self, id: LoopId) {
        self.revision += 1;
        if let Some(lp) = self.loops.get_mut(id.index()) {
            lp.edit_revision = self.revision;
            self.changes.insert(id);
        }
    }

    /// Loops edited since the last flush.
    pub fn dirty_loops(&self) -> impl Iterator<Item = LoopId> + '_ {
        self.changes.iter().copied()
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Recompute cached geometry for every loop on the change list, then for
    /// the shapes owning them. Afterwards nothing in the document is dirty.
    ///
    /// Caches are committed only once every loop has been recomputed; on
    /// error the change list and all caches are left as they were.
    pub fn flush_dirty(&mut self) -> Result<FlushReport, PathError> {
        let mut computed = Vec::with_capacity(self.changes.len());
        for &id in &self.changes {
            computed.push((id, self.compute_cache(id)?));
        }
        let mut report = FlushReport::default();
        let mut shapes: BTreeSet<ShapeId> = BTreeSet::new();

        for (id, cache) in computed {
            let lp = &mut self.loops[id.index()];
            lp.cache = cache;
            shapes.insert(lp.shape);
            self.changes.remove(&id);
            report.loops.push(id);
        }

        for sid in shapes {
            let bounds = self.shapes[sid.index()]
                .loops
                .iter()
                .map(|l| self.loops[l.index()].cache.bounds)
                .fold(Bounds::EMPTY, |acc, b| acc.union(&b));
            self.shapes[sid.index()].bounds = bounds;
            report.shapes.push(sid);
        }

        if !report.is_empty() {
            log::debug!(
                "flushed {} loops across {} shapes",
                report.loops.len(),
                report.shapes.len()
            );
        }
        Ok(report)
    }

    fn compute_cache(&self, id: LoopId) -> Result<LoopCache, PathError> {
        let lp = self.get_loop(id)?;
        let segments = self.loop_segments(id)?;
        let mut bounds = Bounds::EMPTY;
        let mut arc_length = 0.0;
        let mut signed_area = 0.0;
        let mut points = Vec::new();
        for seg in &segments {
            bounds.include(seg.p0);
            points.clear();
            seg.flatten_into(CACHE_TOLERANCE, &mut points);
            for &p in &points {
                bounds.include(p);
            }
            arc_length += seg.length(CACHE_TOLERANCE);
            signed_area += seg.signed_area();
        }
        if let (false, Some(first), Some(last)) = (lp.closed, segments.first(), segments.last()) {
            signed_area += Cubic::line(last.p3, first.p0).signed_area();
        }
        if segments.is_empty() {
            for nid in self.loop_nodes(id)? {
                bounds.include(self.nodes[nid.index()].pos);
            }
        }
        Ok(LoopCache {
            revision: lp.edit_revision,
            arc_length,
            bounds,
            signed_area,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn rectangle_is_a_closed_loop_of_four() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let loops = doc.shape(shape).unwrap().loops().to_vec();
        assert_eq!(loops.len(), 1);
        let nodes = doc.loop_nodes(loops[0]).unwrap();
        assert_eq!(nodes.len(), 4);

        // Walking `next` from any node returns to it after node_count steps.
        for &start in &nodes {
            let mut cur = start;
            for _ in 0..nodes.len() {
                cur = doc.node(cur).unwrap().next().unwrap();
            }
            assert_eq!(cur, start);
        }
    }

    #[test]
    fn flush_clears_dirty_and_fills_cache() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0));
        let lid = doc.shape(shape).unwrap().loops()[0];
        assert!(doc.get_loop(lid).unwrap().is_dirty());

        let report = doc.flush_dirty().unwrap();
        assert_eq!(report.loops, vec![lid]);
        assert_eq!(report.shapes, vec![shape]);
        assert!(!doc.is_dirty());

        let lp = doc.get_loop(lid).unwrap();
        assert!(!lp.is_dirty());
        assert!((lp.cache().arc_length - 6.0).abs() < 1e-5);
        assert!((lp.cache().signed_area - 2.0).abs() < 1e-5);
        assert_eq!(doc.shape(shape).unwrap().bounds().max, Vec2::new(2.0, 1.0));

        // A second flush has nothing to do.
        assert!(doc.flush_dirty().unwrap().is_empty());
    }

    #[test]
    fn editing_marks_only_the_owning_loop() {
        let mut doc = Document::new();
        let a = doc.add_rectangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = doc.add_rectangle(Vec2::new(2.0, 0.0), Vec2::new(3.0, 1.0));
        doc.flush_dirty().unwrap();

        let lb = doc.shape(b).unwrap().loops()[0];
        let first = doc.get_loop(lb).unwrap().start();
        doc.set_node_position(first, Vec2::new(1.5, -1.0)).unwrap();

        let dirty: Vec<LoopId> = doc.dirty_loops().collect();
        assert_eq!(dirty, vec![lb]);
        let report = doc.flush_dirty().unwrap();
        assert_eq!(report.shapes, vec![b]);
        let la = doc.shape(a).unwrap().loops()[0];
        assert!(!doc.get_loop(la).unwrap().is_dirty());
        assert_eq!(doc.shape(b).unwrap().bounds().min, Vec2::new(1.5, -1.0));
    }

    #[test]
    fn ellipse_area_matches_circle() {
        let mut doc = Document::new();
        let shape = doc.add_ellipse(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0));
        doc.flush_dirty().unwrap();
        let lid = doc.shape(shape).unwrap().loops()[0];
        let cache = *doc.get_loop(lid).unwrap().cache();
        assert!((cache.signed_area - PI).abs() < 5e-3);
        assert!((cache.arc_length - 2.0 * PI).abs() < 1e-2);
    }

    #[test]
    fn split_segment_preserves_curve() {
        let mut doc = Document::new();
        let shape = doc.add_ellipse(Vec2::ZERO, Vec2::new(2.0, 1.0));
        let lid = doc.shape(shape).unwrap().loops()[0];
        let start = doc.get_loop(lid).unwrap().start();
        let before = doc.segment(start).unwrap().unwrap();
        let inserted = doc.split_segment(start, 0.3).unwrap().unwrap();

        assert_eq!(doc.get_loop(lid).unwrap().node_count(), 5);
        assert!(doc.node(inserted).unwrap().pos().is_near(before.eval(0.3), 1e-5));
        let first_half = doc.segment(start).unwrap().unwrap();
        assert!(first_half.eval(0.5).is_near(before.eval(0.15), 1e-4));
        assert_eq!(doc.loop_nodes(lid).unwrap().len(), 5);
    }

    #[test]
    fn corrupted_links_fail_fast() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let lid = doc.shape(shape).unwrap().loops()[0];
        let start = doc.get_loop(lid).unwrap().start();
        doc.nodes[start.index() + 2].next = None;
        match doc.loop_nodes(lid) {
            Err(PathError::InvalidTopology { loop_id, .. }) => assert_eq!(loop_id, lid),
            other => panic!("expected topology error, got {:?}", other),
        }
        assert!(doc.flush_dirty().is_err());
    }

    #[test]
    fn failed_flush_commits_nothing() {
        let mut doc = Document::new();
        let shape = doc.add_shape();
        let square = |o: f32| {
            [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
                .map(|(x, y)| NodeData::corner(Vec2::new(x + o, y)))
        };
        let a = doc.add_loop(shape, &square(0.0), true).unwrap();
        let b = doc.add_loop(shape, &square(2.0), true).unwrap();
        doc.flush_dirty().unwrap();

        let a_start = doc.get_loop(a).unwrap().start();
        doc.set_node_position(a_start, Vec2::new(-10.0, -10.0)).unwrap();
        let b_start = doc.get_loop(b).unwrap().start();
        doc.mark_dirty(b);
        doc.nodes[b_start.index() + 1].next = None;

        assert!(doc.flush_dirty().is_err());
        assert!(doc.get_loop(a).unwrap().is_dirty());
        assert_eq!(doc.dirty_loops().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(doc.shape(shape).unwrap().bounds().min, Vec2::new(0.0, 0.0));

        doc.nodes[b_start.index() + 1].next = Some(NodeId(b_start.0 + 2));
        let report = doc.flush_dirty().unwrap();
        assert_eq!(report.loops, vec![a, b]);
        assert!(!doc.get_loop(a).unwrap().is_dirty());
        assert_eq!(doc.shape(shape).unwrap().bounds().min, Vec2::new(-10.0, -10.0));
    }

    #[test]
    fn open_polyline_and_closest_segment() {
        let mut doc = Document::new();
        let shape = doc.add_polygon(&[Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)], false);
        let lid = doc.shape(shape).unwrap().loops()[0];
        assert_eq!(doc.loop_segments(lid).unwrap().len(), 1);

        let hit = doc.closest_segment(Vec2::new(0.0, 2.0)).unwrap();
        assert_eq!(hit.distance, 2.0);
        assert_eq!(hit.t, 0.0);
        assert_eq!(hit.node, doc.get_loop(lid).unwrap().start());
    }

    #[test]
    fn layers_collect_shapes() {
        let mut doc = Document::new();
        doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let second = doc.add_layer("overlay");
        let s = doc.add_ellipse(Vec2::ZERO, Vec2::new(1.0, 1.0));
        assert_eq!(doc.layers().count(), 2);
        assert_eq!(doc.layer(second).unwrap().shapes(), &[s]);
        assert_eq!(doc.layer(second).unwrap().name(), "overlay");
        assert_eq!(doc.shapes().count(), 2);
        assert_eq!(doc.enumerate_nodes().count(), 8);
    }
}
