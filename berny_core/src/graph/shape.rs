// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: shapes and layers

use super::LoopId;
use crate::types::Bounds;

/// Stable index of a shape inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub(crate) u32);

impl ShapeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable index of a layer inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u32);

impl LayerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One fillable/strokeable unit: an outer contour plus any holes.
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) layer: LayerId,
    pub(crate) loops: Vec<LoopId>,
    pub(crate) bounds: Bounds,
}

impl Shape {
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn loops(&self) -> &[LoopId] {
        &self.loops
    }

    /// Union of the loop bounds as of the last flush.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Ordered collection of shapes. Grouping and z-order only.
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) name: String,
    pub(crate) shapes: Vec<ShapeId>,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shapes in back-to-front order.
    pub fn shapes(&self) -> &[ShapeId] {
        &self.shapes
    }
}
