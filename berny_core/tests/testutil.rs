// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
#![allow(dead_code)]
use berny_core::geometry::polygon;
use berny_core::types::Vec2;
use proptest::prelude::*;

pub fn vec2_strategy() -> impl Strategy<Value = Vec2> {
    (-1000.0f32..1000.0f32, -1000.0f32..1000.0f32).prop_map(|(x, y)| Vec2 { x, y })
}

pub fn vec2_unit_strategy() -> impl Strategy<Value = Vec2> {
    (-1.0f32..1.0f32, -1.0f32..1.0f32).prop_map(|(x, y)| Vec2 { x, y })
}

/// Simple star-shaped polygon around `center`, counter-clockwise.
pub fn star_polygon_strategy() -> impl Strategy<Value = Vec<Vec2>> {
    (
        proptest::collection::vec(0.5f32..2.0f32, 3..12),
        vec2_unit_strategy(),
    )
        .prop_map(|(radii, center)| {
            let n = radii.len();
            radii
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    let a = i as f32 / n as f32 * std::f32::consts::TAU;
                    Vec2::new(center.x + r * a.cos(), center.y + r * a.sin())
                })
                .collect()
        })
}

/// Total unsigned area of an indexed triangle list.
pub fn mesh_area(positions: &[Vec2], indices: &[u32]) -> f32 {
    indices
        .chunks_exact(3)
        .map(|t| {
            polygon::triangle_area(
                positions[t[0] as usize],
                positions[t[1] as usize],
                positions[t[2] as usize],
            )
            .abs()
        })
        .sum()
}

/// Signed areas of every triangle of an indexed list.
pub fn triangle_areas(positions: &[Vec2], indices: &[u32]) -> Vec<f32> {
    indices
        .chunks_exact(3)
        .map(|t| {
            polygon::triangle_area(
                positions[t[0] as usize],
                positions[t[1] as usize],
                positions[t[2] as usize],
            )
        })
        .collect()
}
