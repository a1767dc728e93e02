// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: polygon helpers shared by extraction and triangulation

use crate::types::Vec2;

/// Shoelace signed area; counter-clockwise rings are positive.
pub fn signed_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut total = 0.0f64;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        total += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (total * 0.5) as f32
}

/// Signed area of one triangle.
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a) * 0.5
}

/// Winding number of `ring` around `p`. Points on the boundary give an
/// unspecified but finite answer.
pub fn winding_number(ring: &[Vec2], p: Vec2) -> i32 {
    let mut wn = 0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        if a.y <= p.y {
            if b.y > p.y && (b - *a).cross(p - *a) > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && (b - *a).cross(p - *a) < 0.0 {
            wn -= 1;
        }
    }
    wn
}

/// Intersection of segments `a0-a1` and `b0-b1` strictly inside both, as
/// fractions along each.
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2, end_eps: f32) -> Option<(f32, f32)> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.cross(s);
    let scale = r.length_sq() * s.length_sq();
    if denom * denom <= scale * 1e-12 {
        return None;
    }
    let q = b0 - a0;
    let t = q.cross(s) / denom;
    let u = q.cross(r) / denom;
    let inside = |v: f32| v > end_eps && v < 1.0 - end_eps;
    if inside(t) && inside(u) {
        Some((t, u))
    } else {
        None
    }
}

/// Distance from `p` to the closed segment `a-b`.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON * f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Distance from `p` to the nearest edge of a closed ring.
pub fn ring_distance(ring: &[Vec2], p: Vec2) -> f32 {
    let n = ring.len();
    (0..n)
        .map(|i| point_segment_distance(p, ring[i], ring[(i + 1) % n]))
        .fold(f32::INFINITY, f32::min)
}

/// True when no two non-adjacent edges of the ring properly cross.
/// Touching and collinear overlaps are not counted as crossings.
pub fn is_simple(ring: &[Vec2]) -> bool {
    let n = ring.len();
    if n < 4 {
        return true;
    }
    for i in 0..n {
        let a0 = ring[i];
        let a1 = ring[(i + 1) % n];
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = ring[j];
            let b1 = ring[(j + 1) % n];
            if segment_intersection(a0, a1, b0, b1, 1e-4).is_some() {
                return false;
            }
        }
    }
    true
}

/// True when every turn of the ring has the same sign (collinear turns allowed).
pub fn is_convex(ring: &[Vec2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let c = ring[(i + 2) % n];
        let turn = (b - a).cross(c - b);
        if turn.abs() <= 1e-7 {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    true
}

/// Convex hull (monotone chain), counter-clockwise, without collinear points.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }
    let mut hull: Vec<Vec2> = Vec::with_capacity(pts.len() * 2);
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &Vec2>> = if pass == 0 {
            Box::new(pts.iter())
        } else {
            Box::new(pts.iter().rev())
        };
        for &p in iter {
            while hull.len() >= start + 2 {
                let a = hull[hull.len() - 2];
                let b = hull[hull.len() - 1];
                if (b - a).cross(p - a) <= 0.0 {
                    hull.pop();
                } else {
                    break;
                }
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

/// Remove consecutive points closer than `eps`, including across the wrap.
pub fn dedup_ring(ring: &mut Vec<Vec2>, eps: f32) {
    ring.dedup_by(|b, a| a.is_near(*b, eps));
    while ring.len() > 1 {
        let first = ring[0];
        let last = ring[ring.len() - 1];
        if first.is_near(last, eps) {
            ring.pop();
        } else {
            break;
        }
    }
}
