// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: input loaders

pub mod json;

pub use json::{options_from_reader, typeface_from_reader, typeface_from_slice};
