// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: closed-form cubic Bézier queries

use crate::types::{Bounds, Vec2};
use smallvec::SmallVec;

const COARSE_SAMPLES: usize = 16;
const REFINE_ITERATIONS: usize = 40;
const MAX_FLATTEN_DEPTH: u32 = 16;

/// One cubic Bézier segment in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    /// Start point
    pub p0: Vec2,
    /// First control point
    pub c1: Vec2,
    /// Second control point
    pub c2: Vec2,
    /// End point
    pub p3: Vec2,
}

/// Evaluate a cubic from absolute end and control points.
pub fn evaluate_cubic(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Vec2::new(
        a * p0.x + b * c1.x + c * c2.x + d * p3.x,
        a * p0.y + b * c1.y + c * c2.y + d * p3.y,
    )
}

/// Distance from `query` to the curve and the parameter where it is reached.
///
/// A coarse uniform scan is followed by a bracketed ternary refinement around
/// the best sample. The best candidate only ever improves, and ties keep the
/// smaller parameter.
pub fn closest_point_distance(query: Vec2, p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2) -> (f32, f32) {
    Cubic { p0, c1, c2, p3 }.closest_point(query)
}

impl Cubic {
    pub const fn new(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2) -> Self {
        Self { p0, c1, c2, p3 }
    }

    /// A straight segment. Control points sit on the end points.
    pub const fn line(from: Vec2, to: Vec2) -> Self {
        Self {
            p0: from,
            c1: from,
            c2: to,
            p3: to,
        }
    }

    /// Build a segment from node positions and node-relative tangent handles.
    pub fn from_handles(start: Vec2, tan_out: Vec2, tan_in: Vec2, end: Vec2) -> Self {
        Self {
            p0: start,
            c1: start + tan_out,
            c2: end + tan_in,
            p3: end,
        }
    }

    /// True when both handles collapse onto their end points.
    pub fn is_line(&self) -> bool {
        self.c1 == self.p0 && self.c2 == self.p3
    }

    pub fn eval(&self, t: f32) -> Vec2 {
        evaluate_cubic(self.p0, self.c1, self.c2, self.p3, t)
    }

    /// First derivative at `t`.
    pub fn derivative(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        let a = (self.c1 - self.p0) * (3.0 * mt * mt);
        let b = (self.c2 - self.c1) * (6.0 * mt * t);
        let c = (self.p3 - self.c2) * (3.0 * t * t);
        a + b + c
    }

    /// Unit tangent at `t`. Falls back to the control polygon direction
    /// where the derivative vanishes (collapsed handles).
    pub fn tangent(&self, t: f32) -> Vec2 {
        let d = self.derivative(t);
        if d.length_sq() > 1e-12 {
            return d.normalized();
        }
        let fallback = if t < 0.5 {
            [self.c2 - self.p0, self.p3 - self.p0]
        } else {
            [self.p3 - self.c1, self.p3 - self.p0]
        };
        fallback
            .iter()
            .copied()
            .find(|v| v.length_sq() > 1e-12)
            .map(Vec2::normalized)
            .unwrap_or(Vec2::ZERO)
    }

    /// Reverse direction of travel.
    pub fn reversed(&self) -> Cubic {
        Cubic::new(self.p3, self.c2, self.c1, self.p0)
    }

    /// De Casteljau split at `t`.
    pub fn split(&self, t: f32) -> (Cubic, Cubic) {
        let m1 = self.p0.lerp(self.c1, t);
        let m2 = self.c1.lerp(self.c2, t);
        let m3 = self.c2.lerp(self.p3, t);
        let m4 = m1.lerp(m2, t);
        let m5 = m2.lerp(m3, t);
        let m6 = m4.lerp(m5, t);
        (
            Cubic::new(self.p0, m1, m4, m6),
            Cubic::new(m6, m5, m3, self.p3),
        )
    }

    /// Portion of the curve between `t0` and `t1`.
    pub fn subsection(&self, t0: f32, t1: f32) -> Cubic {
        if t1 <= 0.0 {
            return Cubic::line(self.p0, self.p0);
        }
        let (left, _) = self.split(t1.min(1.0));
        if t0 <= 0.0 {
            return left;
        }
        let (_, right) = left.split((t0 / t1).min(1.0));
        right
    }

    /// Bounds of the control polygon. Always contains the curve.
    pub fn control_bounds(&self) -> Bounds {
        Bounds::from_points([self.p0, self.c1, self.c2, self.p3])
    }

    /// Contribution of this segment to the signed area of a closed path
    /// (Green's theorem; counter-clockwise paths come out positive).
    pub fn signed_area(&self) -> f32 {
        let p = [self.p0, self.c1, self.c2, self.p3];
        let c = |i: usize, j: usize| -> f64 {
            p[i].x as f64 * p[j].y as f64 - p[i].y as f64 * p[j].x as f64
        };
        let sum = 6.0 * c(0, 1)
            + 3.0 * c(0, 2)
            + c(0, 3)
            + 3.0 * c(1, 2)
            + 3.0 * c(1, 3)
            + 6.0 * c(2, 3);
        (sum / 20.0) as f32
    }

    /// Append the points of a polyline approximation, excluding `p0`.
    pub fn flatten_into(&self, tolerance: f32, out: &mut Vec<Vec2>) {
        if self.is_line() {
            out.push(self.p3);
            return;
        }
        flatten_cubic(self, tolerance.max(1e-6), 0, out);
    }

    /// Approximate arc length.
    pub fn length(&self, tolerance: f32) -> f32 {
        if self.is_line() {
            return self.p0.distance(self.p3);
        }
        let mut pts: SmallVec<[Vec2; 32]> = SmallVec::new();
        pts.push(self.p0);
        let mut tmp = Vec::new();
        self.flatten_into(tolerance, &mut tmp);
        pts.extend(tmp);
        pts.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// See [`closest_point_distance`].
    pub fn closest_point(&self, query: Vec2) -> (f32, f32) {
        let dist_sq = |t: f32| (self.eval(t) - query).length_sq();

        let mut best_t = 0.0;
        let mut best_d = dist_sq(0.0);
        for i in 1..=COARSE_SAMPLES {
            let t = i as f32 / COARSE_SAMPLES as f32;
            let d = dist_sq(t);
            if d < best_d {
                best_d = d;
                best_t = t;
            }
        }

        let step = 1.0 / COARSE_SAMPLES as f32;
        let mut lo = (best_t - step).max(0.0);
        let mut hi = (best_t + step).min(1.0);
        for _ in 0..REFINE_ITERATIONS {
            if hi - lo < 1e-7 {
                break;
            }
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            let d1 = dist_sq(m1);
            let d2 = dist_sq(m2);
            if d1 < best_d || (d1 == best_d && m1 < best_t) {
                best_d = d1;
                best_t = m1;
            }
            if d2 < best_d {
                best_d = d2;
                best_t = m2;
            }
            if d1 <= d2 {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        (best_d.sqrt(), best_t)
    }
}

fn flatten_cubic(curve: &Cubic, tolerance: f32, depth: u32, out: &mut Vec<Vec2>) {
    if depth >= MAX_FLATTEN_DEPTH || cubic_flat_enough(curve, tolerance) {
        out.push(curve.p3);
    } else {
        let (a, b) = curve.split(0.5);
        flatten_cubic(&a, tolerance, depth + 1, out);
        flatten_cubic(&b, tolerance, depth + 1, out);
    }
}

fn cubic_flat_enough(curve: &Cubic, tol: f32) -> bool {
    let d1 = point_line_distance_sq(curve.c1, curve.p0, curve.p3);
    let d2 = point_line_distance_sq(curve.c2, curve.p0, curve.p3);
    d1 <= tol * tol && d2 <= tol * tol
}

fn point_line_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let v = b - a;
    let len_sq = v.length_sq();
    if len_sq <= f32::EPSILON {
        return (p - a).length_sq();
    }
    let u = (p - a).dot(v) / len_sq;
    let x = a + v * u;
    (x - p).length_sq()
}
