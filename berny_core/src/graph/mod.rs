// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: editable path graph
//!
//! Nodes, loops, shapes and layers live in arenas owned by a [`Document`]
//! and refer to each other by index. A closed loop's `next`/`prev` links
//! wrap around; an open loop's end points have a missing neighbour.

mod document;
mod loops;
mod node;
mod round;
mod shape;

pub use document::{Document, FlushReport, SegmentHit, KAPPA};
pub use loops::{Loop, LoopCache, LoopId};
pub use node::{Node, NodeData, NodeId};
pub use round::RoundAmount;
pub use shape::{Layer, LayerId, Shape, ShapeId};
