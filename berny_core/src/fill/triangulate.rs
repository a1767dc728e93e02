// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: island triangulation
//!
//! Islands are flattened to polygon rings and handed to earcut, or to the
//! lyon fill tessellator when the `lyon` feature is enabled. Results that
//! fail or do not cover the island are replaced by a convex hull fan.

use super::island::{FillIsland, Winding};
use super::repo::Vector2Repo;
use crate::config::WindingRequirement;
use crate::geometry::polygon;
use crate::types::Vec2;

/// Relative area mismatch above which a triangulation is rejected.
const COVERAGE_TOLERANCE: f32 = 0.01;
/// Triangles with less area than this are dropped.
const MIN_TRIANGLE_AREA: f32 = 1e-12;

/// Outcome of triangulating one island.
#[derive(Debug, Default)]
pub(crate) struct Triangulation {
    pub triangles: Vec<[Vec2; 3]>,
    /// Set when the hull fallback was used.
    pub fallback: Option<String>,
}

/// Triangulate one island in document coordinates.
pub(crate) fn triangulate_island(
    island: &FillIsland,
    tolerance: f32,
    flatten_curves: bool,
    snap_eps: f32,
) -> Triangulation {
    let mut rings = island.rings(tolerance, flatten_curves, snap_eps).into_iter();
    let Some(mut outer) = rings.next() else {
        return Triangulation::default();
    };
    if outer.len() < 3 {
        return Triangulation::default();
    }
    if polygon::signed_area(&outer) < 0.0 {
        outer.reverse();
    }
    let holes: Vec<Vec<Vec2>> = rings
        .filter(|h| h.len() >= 3)
        .map(|mut h| {
            if polygon::signed_area(&h) > 0.0 {
                h.reverse();
            }
            h
        })
        .collect();

    let expected = polygon::signed_area(&outer).abs()
        - holes.iter().map(|h| polygon::signed_area(h).abs()).sum::<f32>();
    let checked = triangulate_rings(&outer, &holes).and_then(|tris| {
        let covered: f32 = tris
            .iter()
            .map(|t| polygon::triangle_area(t[0], t[1], t[2]).abs())
            .sum();
        let slack = COVERAGE_TOLERANCE * expected.abs().max(f32::EPSILON);
        if (covered - expected).abs() > slack {
            Err(format!("triangles cover {} of expected {}", covered, expected))
        } else {
            Ok(tris)
        }
    });
    match checked {
        Ok(triangles) => Triangulation {
            triangles,
            fallback: None,
        },
        Err(reason) => Triangulation {
            triangles: hull_fan(&outer),
            fallback: Some(reason),
        },
    }
}

/// Fan over the convex hull of `points`.
fn hull_fan(points: &[Vec2]) -> Vec<[Vec2; 3]> {
    let hull = polygon::convex_hull(points);
    if hull.len() < 3 {
        return Vec::new();
    }
    (1..hull.len() - 1)
        .map(|i| [hull[0], hull[i], hull[i + 1]])
        .collect()
}

#[cfg(not(feature = "lyon"))]
fn triangulate_rings(outer: &[Vec2], holes: &[Vec<Vec2>]) -> Result<Vec<[Vec2; 3]>, String> {
    use earcutr::earcut;

    let mut verts: Vec<Vec2> = outer.to_vec();
    let mut hole_starts = Vec::with_capacity(holes.len());
    for h in holes {
        hole_starts.push(verts.len());
        verts.extend_from_slice(h);
    }
    let coords: Vec<f64> = verts
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();
    let idx = earcut(&coords, &hole_starts, 2).map_err(|_| "earcut failed".to_string())?;
    if idx.len() % 3 != 0 {
        return Err(format!("earcut returned {} indices", idx.len()));
    }
    Ok(idx
        .chunks_exact(3)
        .map(|t| [verts[t[0]], verts[t[1]], verts[t[2]]])
        .collect())
}

#[cfg(feature = "lyon")]
fn triangulate_rings(outer: &[Vec2], holes: &[Vec<Vec2>]) -> Result<Vec<[Vec2; 3]>, String> {
    use lyon::math::point;
    use lyon::path::Path as LyonPath;
    use lyon::tessellation::{
        BuffersBuilder, FillOptions as LyonFillOptions, FillRule as LyonFillRule,
        FillTessellator, FillVertex, VertexBuffers,
    };

    let mut builder = LyonPath::builder();
    for ring in std::iter::once(outer).chain(holes.iter().map(Vec::as_slice)) {
        builder.begin(point(ring[0].x, ring[0].y));
        for p in &ring[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();
    let mut tess = FillTessellator::new();
    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    tess.tessellate_path(
        &path,
        &LyonFillOptions::tolerance(0.01).with_fill_rule(LyonFillRule::NonZero),
        &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
            let p = v.position();
            Vec2::new(p.x, p.y)
        }),
    )
    .map_err(|e| format!("lyon tessellation failed: {:?}", e))?;
    let verts = &buffers.vertices;
    Ok(buffers
        .indices
        .chunks_exact(3)
        .map(|t| [verts[t[0] as usize], verts[t[1] as usize], verts[t[2] as usize]])
        .collect())
}

/// Orient triangles, resolve their corners through `repo` and append the
/// indices to `out`. Returns how many triangles were written.
pub(crate) fn emit_triangles(
    triangles: &[[Vec2; 3]],
    island_winding: Winding,
    requirement: WindingRequirement,
    consistent: bool,
    repo: &mut Vector2Repo,
    out: &mut Vec<u32>,
) -> usize {
    let target = if consistent {
        requirement
    } else {
        match island_winding {
            Winding::Clockwise => WindingRequirement::Clockwise,
            Winding::CounterClockwise => WindingRequirement::CounterClockwise,
        }
    };
    let mut written = 0;
    for &[a, mut b, mut c] in triangles {
        let area = polygon::triangle_area(a, b, c);
        if area.abs() < MIN_TRIANGLE_AREA {
            continue;
        }
        if !target.accepts(area) {
            std::mem::swap(&mut b, &mut c);
        }
        let ia = repo.get_or_add(a);
        let ib = repo.get_or_add(b);
        let ic = repo.get_or_add(c);
        if ia == ib || ib == ic || ia == ic {
            continue;
        }
        out.extend_from_slice(&[ia, ib, ic]);
        written += 1;
    }
    written
}
