// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: path nodes

use super::LoopId;
use crate::types::Vec2;
use serde::{Deserialize, Serialize};

/// Stable index of a node inside its [`Document`](super::Document) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A point on a path plus its two tangent handles. Handles are offsets
/// relative to `pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) pos: Vec2,
    pub(crate) tan_in: Vec2,
    pub(crate) tan_out: Vec2,
    pub(crate) next: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) owner: LoopId,
}

impl Node {
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Incoming handle, relative to [`pos`](Self::pos).
    pub fn tan_in(&self) -> Vec2 {
        self.tan_in
    }

    /// Outgoing handle, relative to [`pos`](Self::pos).
    pub fn tan_out(&self) -> Vec2 {
        self.tan_out
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    /// Loop this node belongs to.
    pub fn owner(&self) -> LoopId {
        self.owner
    }

    /// Open path end points have a missing neighbour.
    pub fn is_endpoint(&self) -> bool {
        self.next.is_none() || self.prev.is_none()
    }
}

/// Plain node description used when building loops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub pos: Vec2,
    #[serde(default)]
    pub tan_in: Vec2,
    #[serde(default)]
    pub tan_out: Vec2,
}

impl NodeData {
    /// A sharp node with no handles.
    pub fn corner(pos: Vec2) -> Self {
        Self {
            pos,
            tan_in: Vec2::ZERO,
            tan_out: Vec2::ZERO,
        }
    }

    pub fn smooth(pos: Vec2, tan_in: Vec2, tan_out: Vec2) -> Self {
        Self {
            pos,
            tan_in,
            tan_out,
        }
    }
}
