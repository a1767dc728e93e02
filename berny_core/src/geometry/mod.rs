// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: geometry kernel

pub mod bezier;
pub mod intersect;
pub mod polygon;

pub use bezier::{closest_point_distance, evaluate_cubic, Cubic};
pub use intersect::{find_crossings, Adjacency, Crossing, CrossingSearch};
