// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: berny core library
//!
//! Editable cubic paths, fill extraction with fill rules, fixed-width
//! outlines and triangulation into indexed meshes.

pub mod config;
pub mod error;
pub mod fill;
pub mod font;
pub mod geometry;
pub mod graph;
pub mod loader;
pub mod mesh;
pub mod types;

pub use config::{FillOptions, FillRule, LineJoin, WindingRequirement};
pub use error::{LoadError, PathError, QualityWarning};
pub use fill::{FillIsland, FillLoop, FillSession, Vector2Repo};
pub use graph::Document;
pub use mesh::{tessellate, FillType, Mesh};
pub use types::{Vec2, Vec3};
