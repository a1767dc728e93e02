// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: error and warning types

use crate::graph::{LayerId, LoopId, NodeId, ShapeId};

/// Hard failures. Geometry problems never end up here; only corrupted
/// path graphs and stale ids do.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("loop {loop_id:?} has invalid topology: {reason}")]
    InvalidTopology { loop_id: LoopId, reason: String },
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown loop {0:?}")]
    UnknownLoop(LoopId),
    #[error("unknown shape {0:?}")]
    UnknownShape(ShapeId),
    #[error("unknown layer {0:?}")]
    UnknownLayer(LayerId),
}

/// Non-fatal conditions recorded while producing geometry. The pipeline
/// still returns a mesh when these occur.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualityWarning {
    /// A segment pair could not be resolved and was treated as non-crossing.
    #[error("intersection between segments {segment_a} and {segment_b} did not converge")]
    UnresolvedIntersection { segment_a: usize, segment_b: usize },
    /// An island fell back to a convex hull triangulation.
    #[error("island {island} fell back to hull triangulation: {reason}")]
    TriangulationFallback { island: usize, reason: String },
}

/// Errors from the JSON loaders.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}
