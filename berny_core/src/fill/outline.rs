// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: fixed-width outlines
//!
//! Each loop of an island is flattened, normalised to counter-clockwise and
//! offset to both sides. The raw offsets are uncrossed; pieces running the
//! wrong way or lying closer to the source than half the width are
//! discarded. What remains is classified into ribbon islands, and every
//! ribbon's holes are joined to its boundary through zero-width bridges so
//! it can be emitted as one loop.

use super::extract::{classify, resolve_self_intersections};
use super::island::{FillIsland, FillLoop, Winding};
use crate::config::{FillOptions, FillRule, LineJoin};
use crate::error::QualityWarning;
use crate::geometry::polygon;
use crate::types::Vec2;
use std::f32::consts::FRAC_PI_2;

/// Offset pieces must reach at least this fraction of the half width away
/// from their source ring.
const VALID_OFFSET_FRACTION: f32 = 0.95;
/// Upper bound on points emitted for one round join.
const MAX_ARC_STEPS: usize = 64;

impl FillIsland {
    /// Replace this island with a ribbon of `width` centred on its loops,
    /// using default options. See [`make_outline_bridged_with`].
    ///
    /// [`make_outline_bridged_with`]: FillIsland::make_outline_bridged_with
    pub fn make_outline_bridged(&mut self, width: f32) -> Vec<FillIsland> {
        self.make_outline_bridged_with(width, &FillOptions::default())
    }

    /// Replace this island with a ribbon of `width` centred on its loops.
    ///
    /// The ribbon's holes are bridged into its boundary, so every resulting
    /// island has an empty hole list. `self` becomes the first ribbon island;
    /// any further ones are returned. A non-positive width leaves `self`
    /// empty.
    pub fn make_outline_bridged_with(&mut self, width: f32, options: &FillOptions) -> Vec<FillIsland> {
        let mut warnings = Vec::new();
        let mut ribbons = outline_island(self, width, options, &mut warnings).into_iter();
        match ribbons.next() {
            Some(first) => {
                *self = first;
                ribbons.collect()
            }
            None => {
                self.boundary = FillLoop::default();
                self.holes.clear();
                Vec::new()
            }
        }
    }
}

/// Bridged ribbon islands outlining `island`.
pub(crate) fn outline_island(
    island: &FillIsland,
    width: f32,
    options: &FillOptions,
    warnings: &mut Vec<QualityWarning>,
) -> Vec<FillIsland> {
    let half = width * 0.5;
    if !(half > 0.0) {
        return Vec::new();
    }
    let tol = options.flatten_tolerance;
    let eps = options.snap_epsilon;

    let mut rings = Vec::new();
    for lp in island.loops() {
        let mut src = lp.flatten(tol, true);
        polygon::dedup_ring(&mut src, eps);
        if src.len() < 3 {
            continue;
        }
        if polygon::signed_area(&src) < 0.0 {
            src.reverse();
        }
        let outer = offset_ring(&src, half, options, tol);
        let mut inner = offset_ring(&src, -half, options, tol);
        inner.reverse();

        for (raw, want) in [(outer, Winding::CounterClockwise), (inner, Winding::Clockwise)] {
            let mut raw = FillLoop::from_polygon(&raw);
            raw.simplify(eps);
            if raw.len() < 3 {
                continue;
            }
            for piece in resolve_self_intersections(&raw, eps, warnings) {
                if piece.winding() == want && reaches_offset(&piece, &src, half, tol) {
                    rings.push(piece);
                } else {
                    log::trace!("discarding offset piece with {} nodes", piece.len());
                }
            }
        }
    }

    let ribbons = classify(rings, FillRule::NonZero, tol);
    log::debug!("outline of width {} produced {} ribbon islands", width, ribbons.len());
    ribbons.into_iter().map(bridge_holes).collect()
}

/// True when some edge midpoint of `piece` is about `half` away from `src`.
/// Pieces of an offset that folded over its source fail this.
fn reaches_offset(piece: &FillLoop, src: &[Vec2], half: f32, tol: f32) -> bool {
    let limit = half * VALID_OFFSET_FRACTION - tol;
    piece
        .segments()
        .any(|s| polygon::ring_distance(src, s.p0.lerp(s.p3, 0.5)) >= limit)
}

/// Offset a counter-clockwise ring by `d` to its right (outwards for
/// positive `d`). The result may cross itself.
fn offset_ring(ring: &[Vec2], d: f32, options: &FillOptions, tol: f32) -> Vec<Vec2> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        let prev = ring[(i + n - 1) % n];
        let v = ring[i];
        let next = ring[(i + 1) % n];
        let e1 = (v - prev).normalized();
        let e2 = (next - v).normalized();
        let n1 = e1.perp_right();
        let n2 = e2.perp_right();
        let turn = e1.cross(e2);
        let denom = 1.0 + n1.dot(n2);

        if turn.abs() < 1e-6 && e1.dot(e2) > 0.0 {
            out.push(v + n1 * d);
            continue;
        }
        let miter = (denom > 1e-6).then(|| v + (n1 + n2) * (d / denom));

        // Inside of the turn: the two offset edges meet at the miter point.
        if turn * d <= 0.0 {
            match miter {
                Some(m) => out.push(m),
                None => {
                    out.push(v + n1 * d);
                    out.push(v + n2 * d);
                }
            }
            continue;
        }

        let within_limit = denom > 1e-6 && 2.0 / denom <= options.miter_limit * options.miter_limit;
        match (options.line_join, miter) {
            (LineJoin::Miter, Some(m)) if within_limit => out.push(m),
            (LineJoin::Round, _) => push_arc(&mut out, v, n1 * d, n2 * d, tol),
            _ => {
                out.push(v + n1 * d);
                out.push(v + n2 * d);
            }
        }
    }
    out
}

/// Arc around `center` from `center + from` to `center + to`, the short way.
fn push_arc(out: &mut Vec<Vec2>, center: Vec2, from: Vec2, to: Vec2, tol: f32) {
    let radius = from.length();
    let sweep = from.cross(to).atan2(from.dot(to));
    let step = if radius > tol {
        2.0 * (1.0 - tol / radius).acos()
    } else {
        FRAC_PI_2
    };
    let steps = ((sweep.abs() / step.max(1e-3)).ceil() as usize).clamp(1, MAX_ARC_STEPS);
    for k in 0..=steps {
        let (sin, cos) = (sweep * k as f32 / steps as f32).sin_cos();
        let r = Vec2::new(from.x * cos - from.y * sin, from.x * sin + from.y * cos);
        out.push(center + r);
    }
}

/// Join every hole of a polygonal island to its boundary through a
/// zero-width slit, leaving a single weakly simple loop.
///
/// Holes are taken right to left. Each is connected from its rightmost
/// vertex to the nearest boundary vertex the slit can reach without
/// crossing any edge.
fn bridge_holes(island: FillIsland) -> FillIsland {
    if island.holes.is_empty() {
        return island;
    }
    let mut ring: Vec<Vec2> = island.boundary.nodes.iter().map(|n| n.pos).collect();
    if polygon::signed_area(&ring) < 0.0 {
        ring.reverse();
    }
    let mut holes: Vec<Vec<Vec2>> = island
        .holes
        .iter()
        .map(|h| {
            let mut pts: Vec<Vec2> = h.nodes.iter().map(|n| n.pos).collect();
            if polygon::signed_area(&pts) > 0.0 {
                pts.reverse();
            }
            pts
        })
        .filter(|h| !h.is_empty())
        .collect();
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));

    for k in 0..holes.len() {
        let hole = &holes[k];
        let (mi, m) = hole
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.x.total_cmp(&b.1.x))
            .unwrap_or((0, hole[0]));

        let mut candidates: Vec<usize> = (0..ring.len()).collect();
        candidates.sort_by(|&a, &b| {
            ring[a]
                .distance(m)
                .total_cmp(&ring[b].distance(m))
        });
        let Some(&nearest) = candidates.first() else {
            break;
        };
        let j = candidates
            .iter()
            .copied()
            .find(|&j| {
                let p = ring[j];
                !crosses(&ring, m, p) && holes[k..].iter().all(|h| !crosses(h, m, p))
            })
            .unwrap_or_else(|| {
                log::debug!("no clear bridge for hole {}; using nearest vertex", k);
                nearest
            });

        let p = ring[j];
        let mut spliced = Vec::with_capacity(ring.len() + hole.len() + 2);
        spliced.extend_from_slice(&ring[..=j]);
        spliced.extend_from_slice(&hole[mi..]);
        spliced.extend_from_slice(&hole[..=mi]);
        spliced.push(p);
        spliced.extend_from_slice(&ring[j + 1..]);
        ring = spliced;
    }

    FillIsland {
        boundary: FillLoop::from_polygon(&ring),
        holes: Vec::new(),
        winding: island.winding,
    }
}

fn max_x(ring: &[Vec2]) -> f32 {
    ring.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max)
}

/// True when segment `a-b` properly crosses an edge of `ring`.
fn crosses(ring: &[Vec2], a: Vec2, b: Vec2) -> bool {
    let n = ring.len();
    (0..n).any(|i| polygon::segment_intersection(a, b, ring[i], ring[(i + 1) % n], 1e-6).is_some())
}
