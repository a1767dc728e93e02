// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: fill extraction, outlining and triangulation
//!
//! A [`FillSession`] turns path loops into islands (an outer boundary plus
//! holes) that never cross, then triangulates them into a shared
//! [`Vector2Repo`].

mod extract;
mod island;
mod outline;
mod repo;
mod session;
mod triangulate;

pub use crate::config::WindingRequirement;
pub use island::{FillIsland, FillLoop, FillNode, Winding};
pub use repo::{Vector2Repo, DEFAULT_REPO_TOLERANCE};
pub use session::FillSession;
