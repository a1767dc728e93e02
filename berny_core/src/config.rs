// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: tunables for extraction, outlining and triangulation

use serde::{Deserialize, Serialize};

/// Rule deciding which winding numbers count as "inside".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    /// Any non-zero winding number is filled.
    #[default]
    NonZero,
    /// Odd winding numbers are filled.
    EvenOdd,
}

impl FillRule {
    pub fn is_filled(self, winding_number: i32) -> bool {
        match self {
            FillRule::NonZero => winding_number != 0,
            FillRule::EvenOdd => winding_number % 2 != 0,
        }
    }
}

/// How the convex side of an outline corner is closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    /// Extend both edges to their intersection, falling back to a bevel past
    /// the miter limit.
    #[default]
    Miter,
    /// Connect the two offset edges directly.
    Bevel,
    /// Connect the two offset edges with a circular arc.
    Round,
}

/// Orientation emitted triangles must have (y axis pointing up).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindingRequirement {
    /// Negative signed area.
    #[default]
    Clockwise,
    /// Positive signed area.
    CounterClockwise,
}

impl WindingRequirement {
    /// Whether a triangle with this signed area satisfies the requirement.
    pub fn accepts(self, signed_area: f32) -> bool {
        match self {
            WindingRequirement::Clockwise => signed_area < 0.0,
            WindingRequirement::CounterClockwise => signed_area > 0.0,
        }
    }
}

/// All tunables used by a fill/outline/triangulation pass.
///
/// `flatten_tolerance`, `snap_epsilon` and `repo_tolerance` are absolute
/// distances in document units. The defaults suit geometry whose features are
/// around unit size; documents drawn much smaller (glyphs at a tiny em size)
/// should scale them down with the geometry, see [`FillOptions::scaled`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FillOptions {
    /// Fill rule used to classify extracted loops.
    pub fill_rule: FillRule,
    /// Maximum chord error when flattening curves into polygons.
    pub flatten_tolerance: f32,
    /// Distance under which two positions are treated as coincident.
    pub snap_epsilon: f32,
    /// Distance under which the vertex repository merges positions.
    pub repo_tolerance: f32,
    /// Corner policy for outlines.
    pub line_join: LineJoin,
    /// Ratio of miter length to half width past which miters become bevels.
    pub miter_limit: f32,
    /// Flatten curves adaptively before triangulating; otherwise only node
    /// positions are used.
    pub flatten_curves: bool,
    /// Triangle orientation requested from the mesh pipeline.
    pub winding_requirement: WindingRequirement,
    /// Force every triangle to `winding_requirement`. Otherwise triangles
    /// follow their island's orientation.
    pub consistent_winding: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            fill_rule: FillRule::NonZero,
            flatten_tolerance: 0.005,
            snap_epsilon: 1e-4,
            repo_tolerance: 1e-5,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
            flatten_curves: true,
            winding_requirement: WindingRequirement::Clockwise,
            consistent_winding: true,
        }
    }
}

impl FillOptions {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn with_line_join(mut self, line_join: LineJoin) -> Self {
        self.line_join = line_join;
        self
    }

    /// Distance tolerances multiplied by `factor`, for documents drawn at a
    /// different size than unit.
    pub fn scaled(mut self, factor: f32) -> Self {
        self.flatten_tolerance *= factor;
        self.snap_epsilon *= factor;
        self.repo_tolerance *= factor;
        self
    }

    pub fn with_flatten_tolerance(mut self, tolerance: f32) -> Self {
        self.flatten_tolerance = tolerance;
        self
    }
}
