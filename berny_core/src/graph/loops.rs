// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: node loops

use super::{NodeId, ShapeId};
use crate::types::Bounds;

/// Stable index of a loop inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopId(pub(crate) u32);

impl LoopId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Geometry derived from a loop's nodes, refreshed by
/// [`Document::flush_dirty`](super::Document::flush_dirty).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopCache {
    /// Edit revision these values were computed at.
    pub revision: u64,
    pub arc_length: f32,
    pub bounds: Bounds,
    /// Positive for counter-clockwise loops. Open loops are measured as if
    /// closed by a straight edge.
    pub signed_area: f32,
}

/// An ordered chain of nodes, owned by one shape.
#[derive(Debug, Clone)]
pub struct Loop {
    pub(crate) start: NodeId,
    pub(crate) count: usize,
    pub(crate) closed: bool,
    pub(crate) shape: ShapeId,
    pub(crate) edit_revision: u64,
    pub(crate) cache: LoopCache,
}

impl Loop {
    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn node_count(&self) -> usize {
        self.count
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn cache(&self) -> &LoopCache {
        &self.cache
    }

    /// Revision of the last edit to this loop.
    pub fn edit_revision(&self) -> u64 {
        self.edit_revision
    }

    /// True when the cache predates the last edit.
    pub fn is_dirty(&self) -> bool {
        self.cache.revision != self.edit_revision
    }
}
