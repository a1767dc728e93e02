// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: outline glyphs
//!
//! Glyph contours use TrueType conventions: points are either on the curve
//! or quadratic control points, and two consecutive control points imply an
//! on-curve point halfway between them.

use crate::fill::{FillLoop, FillNode};
use crate::graph::NodeData;
use crate::types::Vec2;

/// One contour point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourPoint {
    pub position: Vec2,
    pub on_curve: bool,
}

impl ContourPoint {
    pub fn on(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            on_curve: true,
        }
    }

    pub fn off(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            on_curve: false,
        }
    }
}

/// A closed glyph contour.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points: Vec<ContourPoint>,
}

impl Contour {
    /// Nodes of the equivalent cubic loop, scaled then offset.
    ///
    /// Quadratic pieces are raised to cubics exactly; straight pieces get
    /// zero handles.
    pub fn node_loop(&self, offset: Vec2, scale: f32) -> Vec<NodeData> {
        let pts = &self.points;
        let n = pts.len();
        if n == 0 {
            return Vec::new();
        }
        // Insert the implied on-curve points.
        let mut seq: Vec<ContourPoint> = Vec::with_capacity(n * 2);
        for i in 0..n {
            let cur = pts[i];
            let nxt = pts[(i + 1) % n];
            seq.push(cur);
            if !cur.on_curve && !nxt.on_curve {
                seq.push(ContourPoint {
                    position: cur.position.lerp(nxt.position, 0.5),
                    on_curve: true,
                });
            }
        }
        let Some(first_on) = seq.iter().position(|p| p.on_curve) else {
            return Vec::new();
        };
        seq.rotate_left(first_on);

        let place = |p: Vec2| offset + p * scale;
        let mut nodes: Vec<NodeData> = seq
            .iter()
            .filter(|p| p.on_curve)
            .map(|p| NodeData::corner(place(p.position)))
            .collect();
        let count = nodes.len();
        let mut node = 0;
        for (i, p) in seq.iter().enumerate() {
            if p.on_curve {
                if i > 0 {
                    node += 1;
                }
                continue;
            }
            let from = node % count;
            let to = (node + 1) % count;
            let ctrl = place(p.position);
            let a = nodes[from].pos;
            let b = nodes[to].pos;
            nodes[from].tan_out = (ctrl - a) * (2.0 / 3.0);
            nodes[to].tan_in = (ctrl - b) * (2.0 / 3.0);
        }
        nodes
    }
}

/// A glyph made of closed contours.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Glyph {
    pub name: String,
    pub advance: f32,
    pub contours: Vec<Contour>,
}

impl Glyph {
    pub fn node_loops(&self, offset: Vec2) -> Vec<Vec<NodeData>> {
        self.node_loops_scaled(offset, 1.0)
    }

    pub fn node_loops_scaled(&self, offset: Vec2, scale: f32) -> Vec<Vec<NodeData>> {
        self.contours
            .iter()
            .map(|c| c.node_loop(offset, scale))
            .filter(|nodes| !nodes.is_empty())
            .collect()
    }

    /// The glyph as detached fill loops, ready for a fill session.
    pub fn fill_loops(&self, offset: Vec2, scale: f32) -> Vec<FillLoop> {
        self.node_loops_scaled(offset, scale)
            .into_iter()
            .map(|nodes| FillLoop {
                nodes: nodes.into_iter().map(FillNode::from).collect(),
            })
            .collect()
    }
}

/// A set of glyphs sharing a design grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Typeface {
    pub name: String,
    pub units_per_em: f32,
    pub glyphs: Vec<Glyph>,
}

impl Default for Typeface {
    fn default() -> Self {
        Self {
            name: String::new(),
            units_per_em: 1.0,
            glyphs: Vec::new(),
        }
    }
}

impl Typeface {
    pub fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.name == name)
    }

    /// Factor mapping design units to one em.
    pub fn scale(&self) -> f32 {
        if self.units_per_em > 0.0 {
            1.0 / self.units_per_em
        } else {
            1.0
        }
    }

    /// Fill loops of a run of glyphs laid out left to right, in em units.
    pub fn layout(&self, names: &[&str], origin: Vec2) -> Vec<FillLoop> {
        let scale = self.scale();
        let mut pen = origin;
        let mut loops = Vec::new();
        for name in names {
            match self.glyph(name) {
                Some(g) => {
                    loops.extend(g.fill_loops(pen, scale));
                    pen.x += g.advance * scale;
                }
                None => log::debug!("typeface {} has no glyph {}", self.name, name),
            }
        }
        loops
    }
}
