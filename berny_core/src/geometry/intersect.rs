// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: segment-vs-segment crossing search
//!
//! Curves are pruned by control-polygon bounds and subdivided until both
//! pieces are small enough, relative to the pair's starting size, for their
//! chords to stand in for them. Straight segments skip the subdivision
//! entirely.
//!
//! Parameters returned for straight segments are linear fractions along the
//! chord; for curved segments they are Bézier parameters.

use super::bezier::Cubic;
use super::polygon::segment_intersection;
use smallvec::SmallVec;

/// Crossings closer than this to either end of a segment are ignored.
pub const END_EPS: f32 = 1e-4;
/// Crossings whose tangents make a smaller angle (sine) are treated as touches.
pub const TANGENT_EPS: f32 = 1e-3;
/// Two detections closer than this in both parameters are the same crossing.
pub const MERGE_EPS: f32 = 1e-3;
/// A cubic pair crosses at most nine times; more means overlapping curves.
pub const MAX_CROSSINGS: usize = 9;

/// Splits allowed per curve.
const MAX_DEPTH: u32 = 40;
const MAX_VISITS: usize = 8192;
/// Stopping size as a fraction of the pair's extent.
const ACCURACY: f32 = 1e-5;

/// How two segments of one loop are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Adjacency {
    /// The end of `a` is the start of `b`.
    pub a_then_b: bool,
    /// The end of `b` is the start of `a`.
    pub b_then_a: bool,
}

/// One crossing between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub t_a: f32,
    pub t_b: f32,
}

/// Result of a crossing search.
#[derive(Debug, Clone, PartialEq)]
pub enum CrossingSearch {
    Found(SmallVec<[Crossing; MAX_CROSSINGS]>),
    /// The search did not converge; callers treat the pair as non-crossing.
    Unresolved,
}

/// Find where `a` and `b` properly cross.
pub fn find_crossings(a: &Cubic, b: &Cubic, adjacency: Adjacency) -> CrossingSearch {
    let mut found: SmallVec<[Crossing; MAX_CROSSINGS]> = SmallVec::new();

    if a.is_line() && b.is_line() {
        if let Some((t_a, t_b)) = segment_intersection(a.p0, a.p3, b.p0, b.p3, END_EPS) {
            let da = (a.p3 - a.p0).normalized();
            let db = (b.p3 - b.p0).normalized();
            if da.cross(db).abs() >= TANGENT_EPS {
                found.push(Crossing { t_a, t_b });
            }
        }
        return CrossingSearch::Found(found);
    }

    let scale = a.control_bounds().union(&b.control_bounds()).extent();
    let mut search = Search {
        adjacency,
        margin: ACCURACY * scale,
        stop: ACCURACY * 16.0 * scale,
        visits: 0,
        unresolved: false,
        raw: Vec::new(),
    };
    search.recurse(a, (0.0, 1.0), b, (0.0, 1.0), (0, 0));
    if search.unresolved {
        return CrossingSearch::Unresolved;
    }

    for hit in search.raw {
        let t_a = if a.is_line() { line_fraction(hit.t_a) } else { hit.t_a };
        let t_b = if b.is_line() { line_fraction(hit.t_b) } else { hit.t_b };
        if t_a <= END_EPS || t_a >= 1.0 - END_EPS || t_b <= END_EPS || t_b >= 1.0 - END_EPS {
            continue;
        }
        let sin = a.tangent(hit.t_a).cross(b.tangent(hit.t_b)).abs();
        if sin < TANGENT_EPS {
            continue;
        }
        let duplicate = found
            .iter()
            .any(|c| (c.t_a - t_a).abs() < MERGE_EPS && (c.t_b - t_b).abs() < MERGE_EPS);
        if duplicate {
            continue;
        }
        if found.len() == MAX_CROSSINGS {
            return CrossingSearch::Unresolved;
        }
        found.push(Crossing { t_a, t_b });
    }
    CrossingSearch::Found(found)
}

/// Position along the chord of a straight cubic with collapsed handles.
fn line_fraction(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

struct Search {
    adjacency: Adjacency,
    /// Slack on bounds overlap tests.
    margin: f32,
    /// Pieces smaller than this are treated as their chords.
    stop: f32,
    visits: usize,
    unresolved: bool,
    raw: Vec<Crossing>,
}

impl Search {
    /// `depth` counts the splits of `a` and `b` separately.
    fn recurse(&mut self, a: &Cubic, ra: (f32, f32), b: &Cubic, rb: (f32, f32), depth: (u32, u32)) {
        if self.unresolved {
            return;
        }
        self.visits += 1;
        if self.visits > MAX_VISITS {
            self.unresolved = true;
            return;
        }
        if self.adjacency.a_then_b && ra.0 >= 1.0 - END_EPS && rb.1 <= END_EPS {
            return;
        }
        if self.adjacency.b_then_a && ra.1 <= END_EPS && rb.0 >= 1.0 - END_EPS {
            return;
        }

        let ba = a.control_bounds();
        let bb = b.control_bounds();
        if !ba.overlaps(&bb, self.margin) {
            return;
        }

        let ea = ba.extent();
        let eb = bb.extent();
        if ea <= self.stop && eb <= self.stop {
            if let Some((sa, sb)) = segment_intersection(a.p0, a.p3, b.p0, b.p3, -0.5) {
                let sa = sa.clamp(0.0, 1.0);
                let sb = sb.clamp(0.0, 1.0);
                self.raw.push(Crossing {
                    t_a: ra.0 + (ra.1 - ra.0) * sa,
                    t_b: rb.0 + (rb.1 - rb.0) * sb,
                });
            }
            return;
        }
        let split_a = ea >= eb;
        if (split_a && depth.0 >= MAX_DEPTH) || (!split_a && depth.1 >= MAX_DEPTH) {
            log::trace!("crossing search hit depth limit at {:?} / {:?}", ra, rb);
            self.unresolved = true;
            return;
        }

        if split_a {
            let (a0, a1) = a.split(0.5);
            let mid = (ra.0 + ra.1) * 0.5;
            let next = (depth.0 + 1, depth.1);
            self.recurse(&a0, (ra.0, mid), b, rb, next);
            self.recurse(&a1, (mid, ra.1), b, rb, next);
        } else {
            let (b0, b1) = b.split(0.5);
            let mid = (rb.0 + rb.1) * 0.5;
            let next = (depth.0, depth.1 + 1);
            self.recurse(a, ra, &b0, (rb.0, mid), next);
            self.recurse(a, ra, &b1, (mid, rb.1), next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec2;

    fn found(search: CrossingSearch) -> SmallVec<[Crossing; MAX_CROSSINGS]> {
        match search {
            CrossingSearch::Found(f) => f,
            CrossingSearch::Unresolved => panic!("search did not converge"),
        }
    }

    #[test]
    fn crossing_lines() {
        let a = Cubic::line(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let b = Cubic::line(Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0));
        let hits = found(find_crossings(&a, &b, Adjacency::default()));
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t_a - 0.5).abs() < 1e-6);
        assert!((hits[0].t_b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn parallel_lines_do_not_cross() {
        let a = Cubic::line(Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0));
        let b = Cubic::line(Vec2::new(0.0, 1.0), Vec2::new(2.0, 1.0));
        assert!(found(find_crossings(&a, &b, Adjacency::default())).is_empty());
    }

    #[test]
    fn curve_crosses_line_twice() {
        let arch = Cubic::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 0.0),
        );
        let line = Cubic::line(Vec2::new(-1.0, 1.0), Vec2::new(3.0, 1.0));
        let hits = found(find_crossings(&arch, &line, Adjacency::default()));
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            let p = arch.eval(hit.t_a);
            assert!((p.y - 1.0).abs() < 1e-3);
            let q = Vec2::new(-1.0, 1.0).lerp(Vec2::new(3.0, 1.0), hit.t_b);
            assert!(p.is_near(q, 1e-3));
        }
    }

    #[test]
    fn curves_cross_at_any_scale() {
        let adjacency = Adjacency {
            a_then_b: true,
            b_then_a: true,
        };
        for scale in [0.01, 1.0, 100.0, 1000.0] {
            let s = |x: f32, y: f32| Vec2::new(x * scale, y * scale);
            let a = Cubic::new(s(0.0, 0.0), s(2.0, 3.0), s(2.0, -3.0), s(4.0, 0.0));
            let b = Cubic::new(s(4.0, 0.0), s(2.0, 3.0), s(2.0, -3.0), s(0.0, 0.0));
            let hits = found(find_crossings(&a, &b, adjacency));
            assert_eq!(hits.len(), 1, "scale {}", scale);
            let p = a.eval(hits[0].t_a);
            assert!(p.is_near(s(2.0, 0.0), 1e-3 * scale), "{:?} at scale {}", p, scale);
        }
    }

    #[test]
    fn shared_end_point_is_not_a_crossing() {
        let a = Cubic::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(3.0, 0.0),
        );
        let b = Cubic::new(
            Vec2::new(3.0, 0.0),
            Vec2::new(2.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(0.5, 0.0),
        );
        let adjacency = Adjacency {
            a_then_b: true,
            b_then_a: false,
        };
        assert!(found(find_crossings(&a, &b, adjacency)).is_empty());
    }
}
