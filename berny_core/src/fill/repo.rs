// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: tolerance-merged vertex store

use crate::types::{Vec2, Vec3};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Default merge distance.
pub const DEFAULT_REPO_TOLERANCE: f32 = 1e-5;

/// Deduplicates 2D positions and hands out dense indices in first-seen
/// order, starting at 0.
///
/// Positions are hashed into a grid of `tolerance`-sized cells, so a lookup
/// only has to check the 3x3 block of cells around the query.
#[derive(Debug, Clone)]
pub struct Vector2Repo {
    positions: Vec<Vec2>,
    cells: HashMap<(i64, i64), SmallVec<[u32; 2]>>,
    tolerance: f32,
}

impl Default for Vector2Repo {
    fn default() -> Self {
        Self::new()
    }
}

impl Vector2Repo {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_REPO_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            positions: Vec::new(),
            cells: HashMap::new(),
            tolerance: tolerance.max(f32::EPSILON),
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    fn cell(&self, p: Vec2) -> (i64, i64) {
        (
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
        )
    }

    /// Index of a stored position within tolerance of `p`, if any. When
    /// several qualify the oldest wins.
    pub fn find(&self, p: Vec2) -> Option<u32> {
        let (cx, cy) = self.cell(p);
        let tol_sq = self.tolerance * self.tolerance;
        let mut best: Option<u32> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &idx in bucket {
                    if (self.positions[idx as usize] - p).length_sq() <= tol_sq
                        && best.map_or(true, |b| idx < b)
                    {
                        best = Some(idx);
                    }
                }
            }
        }
        best
    }

    /// Index for `p`, inserting it when nothing within tolerance is stored.
    pub fn get_or_add(&mut self, p: Vec2) -> u32 {
        if let Some(idx) = self.find(p) {
            return idx;
        }
        let idx = self.positions.len() as u32;
        self.positions.push(p);
        let key = self.cell(p);
        self.cells.entry(key).or_default().push(idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Stored positions with a zero third coordinate, in index order.
    pub fn get_vector3_array(&self) -> Vec<Vec3> {
        self.get_vector3_array_at(0.0)
    }

    /// Stored positions lifted to depth `z`, in index order.
    pub fn get_vector3_array_at(&self, z: f32) -> Vec<Vec3> {
        self.positions.iter().map(|p| p.extend(z)).collect()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.cells.clear();
    }
}
