// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: loop uncrossing and island classification
//!
//! Every input loop is cut at its own crossings and re-traced so that each
//! crossing switches to the other branch. The resulting pieces do not cross
//! themselves or each other, so they nest into a containment tree. Winding
//! numbers follow from the tree, and the fill rule then decides which
//! pieces are island boundaries and which are holes.

use super::island::{FillIsland, FillLoop};
use crate::config::{FillOptions, FillRule};
use crate::error::QualityWarning;
use crate::geometry::{find_crossings, polygon, Adjacency, Cubic, CrossingSearch};
use crate::types::{Bounds, Vec2};
use smallvec::SmallVec;

/// Loops whose area is below this fraction of their squared extent are
/// dropped.
const MIN_AREA_RATIO: f32 = 1e-6;

/// Run the full extraction on raw loops.
pub(crate) fn extract_islands(
    loops: Vec<FillLoop>,
    options: &FillOptions,
    warnings: &mut Vec<QualityWarning>,
) -> Vec<FillIsland> {
    let mut pieces = Vec::new();
    for mut lp in loops {
        lp.simplify(options.snap_epsilon);
        if lp.len() < 2 {
            log::debug!("dropping loop with {} distinct nodes", lp.len());
            continue;
        }
        pieces.extend(resolve_self_intersections(&lp, options.snap_epsilon, warnings));
    }
    classify(pieces, options.fill_rule, options.flatten_tolerance)
}

fn point_on(seg: &Cubic, t: f32) -> Vec2 {
    if seg.is_line() {
        seg.p0.lerp(seg.p3, t)
    } else {
        seg.eval(t)
    }
}

/// Piece of `seg` between `t0` and `t1`, moved so that it starts at `start`
/// and ends at `end` exactly.
fn piece(seg: &Cubic, t0: f32, t1: f32, start: Vec2, end: Vec2) -> Cubic {
    if seg.is_line() {
        return Cubic::line(start, end);
    }
    let sub = seg.subsection(t0, t1);
    Cubic::new(start, sub.c1 + (start - sub.p0), sub.c2 + (end - sub.p3), end)
}

/// Split a loop into pieces that do not cross themselves or each other.
///
/// Pieces touch at the former crossing points. Pieces with less than two
/// distinct nodes or negligible area are dropped.
pub(crate) fn resolve_self_intersections(
    lp: &FillLoop,
    snap_eps: f32,
    warnings: &mut Vec<QualityWarning>,
) -> Vec<FillLoop> {
    let segs: Vec<Cubic> = lp.segments().collect();
    let n = segs.len();
    let boxes: Vec<Bounds> = segs.iter().map(Cubic::control_bounds).collect();

    let mut cuts: Vec<SmallVec<[(f32, usize); 4]>> = vec![SmallVec::new(); n];
    let mut points: Vec<Vec2> = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            if !boxes[i].overlaps(&boxes[j], snap_eps) {
                continue;
            }
            let adjacency = Adjacency {
                a_then_b: j == i + 1,
                b_then_a: i == 0 && j == n - 1,
            };
            match find_crossings(&segs[i], &segs[j], adjacency) {
                CrossingSearch::Found(hits) => {
                    for hit in hits {
                        let id = points.len();
                        let at = (point_on(&segs[i], hit.t_a) + point_on(&segs[j], hit.t_b)) * 0.5;
                        points.push(at);
                        cuts[i].push((hit.t_a, id));
                        cuts[j].push((hit.t_b, id));
                    }
                }
                CrossingSearch::Unresolved => {
                    log::warn!("crossing search between segments {} and {} did not converge", i, j);
                    warnings.push(QualityWarning::UnresolvedIntersection {
                        segment_a: i,
                        segment_b: j,
                    });
                }
            }
        }
    }

    if points.is_empty() {
        return keep_if_solid(lp.clone(), snap_eps).into_iter().collect();
    }
    log::trace!("loop with {} segments has {} crossings", n, points.len());

    // Edge list; `starts_at[e]` names the crossing edge `e` leaves from.
    let mut edges: Vec<Cubic> = Vec::with_capacity(n + 2 * points.len());
    let mut starts_at: Vec<Option<usize>> = Vec::with_capacity(edges.capacity());
    for (seg, seg_cuts) in segs.iter().zip(cuts.iter_mut()) {
        seg_cuts.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut t0 = 0.0;
        let mut from = seg.p0;
        let mut from_id = None;
        for &(t, id) in seg_cuts.iter() {
            let to = points[id];
            edges.push(piece(seg, t0, t, from, to));
            starts_at.push(from_id);
            t0 = t;
            from = to;
            from_id = Some(id);
        }
        edges.push(piece(seg, t0, 1.0, from, seg.p3));
        starts_at.push(from_id);
    }

    let mut leaving: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); points.len()];
    for (e, id) in starts_at.iter().enumerate() {
        if let Some(id) = id {
            leaving[*id].push(e);
        }
    }
    // At a crossing, continue along the other branch.
    let successor = |arrive: usize| -> usize {
        match starts_at[arrive] {
            Some(id) if leaving[id].len() == 2 => {
                if leaving[id][0] == arrive {
                    leaving[id][1]
                } else {
                    leaving[id][0]
                }
            }
            _ => arrive,
        }
    };

    let m = edges.len();
    let mut used = vec![false; m];
    let mut out = Vec::new();
    for start in 0..m {
        if used[start] {
            continue;
        }
        let mut chain = Vec::new();
        let mut cur = start;
        while !used[cur] {
            used[cur] = true;
            chain.push(edges[cur]);
            cur = successor((cur + 1) % m);
        }
        if let Some(piece) = keep_if_solid(FillLoop::from_cubics(&chain), snap_eps) {
            out.push(piece);
        }
    }
    out
}

fn keep_if_solid(mut lp: FillLoop, snap_eps: f32) -> Option<FillLoop> {
    lp.simplify(snap_eps);
    if lp.len() < 2 {
        log::debug!("dropping piece with {} distinct nodes", lp.len());
        return None;
    }
    let extent = lp.bounds().extent();
    if lp.signed_area().abs() <= MIN_AREA_RATIO * extent * extent {
        log::debug!("dropping zero-area piece with {} nodes", lp.len());
        return None;
    }
    Some(lp)
}

struct Entry {
    lp: FillLoop,
    sign: i32,
    ring: Vec<Vec2>,
    bounds: Bounds,
    sample: Vec2,
}

/// Group non-crossing loops into islands under `rule`.
///
/// A loop is a boundary when the rule gives different answers on its two
/// sides. Boundaries filled on the inside start an island; the others
/// become holes of the nearest enclosing island.
pub(crate) fn classify(loops: Vec<FillLoop>, rule: FillRule, tolerance: f32) -> Vec<FillIsland> {
    let mut entries: Vec<(f32, Entry)> = loops
        .into_iter()
        .map(|lp| {
            let area = lp.signed_area();
            let ring = lp.flatten(tolerance, true);
            let bounds = Bounds::from_points(ring.iter().copied());
            let sample = lp.sample_point();
            let sign = if area < 0.0 { -1 } else { 1 };
            (area.abs(), Entry { lp, sign, ring, bounds, sample })
        })
        .collect();
    // Largest first, so every parent precedes its children.
    entries.sort_by(|a, b| b.0.total_cmp(&a.0));

    let count = entries.len();
    let mut parent: Vec<Option<usize>> = vec![None; count];
    for i in 0..count {
        let sample = entries[i].1.sample;
        parent[i] = (0..i).rev().find(|&j| {
            let e = &entries[j].1;
            e.bounds.contains(sample) && polygon::winding_number(&e.ring, sample) != 0
        });
    }

    let mut inside = vec![0i32; count];
    let mut island_of: Vec<Option<usize>> = vec![None; count];
    let mut islands: Vec<FillIsland> = Vec::new();
    let mut holes: Vec<(usize, FillLoop)> = Vec::new();
    for (i, (_, entry)) in entries.into_iter().enumerate() {
        let outside = parent[i].map_or(0, |p| inside[p]);
        inside[i] = outside + entry.sign;
        let filled_in = rule.is_filled(inside[i]);
        if filled_in == rule.is_filled(outside) {
            continue;
        }
        if filled_in {
            island_of[i] = Some(islands.len());
            islands.push(FillIsland::new(entry.lp));
            continue;
        }
        let mut up = parent[i];
        let owner = loop {
            match up {
                Some(p) if island_of[p].is_some() => break island_of[p],
                Some(p) => up = parent[p],
                None => break None,
            }
        };
        match owner {
            Some(k) => holes.push((k, entry.lp)),
            None => log::debug!("dropping hole with no enclosing island"),
        }
    }
    for (k, hole) in holes {
        islands[k].holes.push(hole);
    }
    islands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::Winding;

    fn poly(points: &[(f32, f32)]) -> FillLoop {
        let pts: Vec<Vec2> = points.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
        FillLoop::from_polygon(&pts)
    }

    #[test]
    fn simple_square_is_one_island() {
        let mut warnings = Vec::new();
        let islands = extract_islands(
            vec![poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])],
            &FillOptions::default(),
            &mut warnings,
        );
        assert_eq!(islands.len(), 1);
        assert!(islands[0].holes.is_empty());
        assert_eq!(islands[0].winding, Winding::CounterClockwise);
        assert!(warnings.is_empty());
    }

    #[test]
    fn bowtie_splits_into_two_lobes() {
        let mut warnings = Vec::new();
        let bowtie = poly(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let pieces = resolve_self_intersections(&bowtie, 1e-4, &mut warnings);
        assert_eq!(pieces.len(), 2);
        let areas: Vec<f32> = pieces.iter().map(FillLoop::signed_area).collect();
        assert!(areas[0] * areas[1] < 0.0);
        for a in areas {
            assert!((a.abs() - 1.0).abs() < 1e-5);
        }
        for p in &pieces {
            assert!(p.nodes.iter().any(|n| n.pos.is_near(Vec2::new(1.0, 1.0), 1e-5)));
        }
    }

    #[test]
    fn nested_square_is_a_hole_under_nonzero_when_reversed() {
        let outer = poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let inner = poly(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
        let islands = classify(vec![inner, outer], FillRule::NonZero, 0.01);
        assert_eq!(islands.len(), 1);
        assert_eq!(islands[0].holes.len(), 1);
        assert!((islands[0].area() - 12.0).abs() < 1e-5);
    }

    #[test]
    fn same_direction_nesting_depends_on_rule() {
        let outer = poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let inner = poly(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]);
        let nonzero = classify(vec![outer.clone(), inner.clone()], FillRule::NonZero, 0.01);
        assert_eq!(nonzero.len(), 1);
        assert!(nonzero[0].holes.is_empty());

        let even_odd = classify(vec![outer, inner], FillRule::EvenOdd, 0.01);
        assert_eq!(even_odd.len(), 1);
        assert_eq!(even_odd[0].holes.len(), 1);
    }

    #[test]
    fn island_inside_hole_is_separate() {
        let outer = poly(&[(0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (0.0, 6.0)]);
        let hole = poly(&[(1.0, 1.0), (1.0, 5.0), (5.0, 5.0), (5.0, 1.0)]);
        let inner = poly(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0)]);
        let islands = classify(vec![outer, hole, inner], FillRule::NonZero, 0.01);
        assert_eq!(islands.len(), 2);
        assert_eq!(islands.iter().map(|i| i.holes.len()).sum::<usize>(), 1);
    }

    #[test]
    fn tiny_loops_survive_with_a_matching_snap_distance() {
        let mut warnings = Vec::new();
        let options = FillOptions::default().scaled(1e-4);
        let side = 1e-5;
        let islands = extract_islands(
            vec![poly(&[(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)])],
            &options,
            &mut warnings,
        );
        assert_eq!(islands.len(), 1);
        assert!((islands[0].area() - side * side).abs() < 1e-12);
    }

    #[test]
    fn slivers_are_dropped_at_any_scale() {
        let mut warnings = Vec::new();
        let sliver = poly(&[(0.0, 0.0), (1000.0, 0.0), (0.0, 1e-6)]);
        let islands = extract_islands(vec![sliver], &FillOptions::default(), &mut warnings);
        assert!(islands.is_empty());
    }

    #[test]
    fn degenerate_loops_are_dropped() {
        let mut warnings = Vec::new();
        let islands = extract_islands(
            vec![
                poly(&[(0.0, 0.0), (0.0, 0.0)]),
                poly(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            ],
            &FillOptions::default(),
            &mut warnings,
        );
        assert!(islands.is_empty());
    }
}
