// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
#![no_main]
use berny_core::loader::json;
use berny_core::mesh::{self, FillType};
use berny_core::types::Vec2;
use berny_core::FillOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(face) = json::typeface_from_slice(data) else {
        return;
    };
    let options = FillOptions::default();
    for glyph in face.glyphs.iter().take(4) {
        let loops = glyph.fill_loops(Vec2::ZERO, face.scale());
        let _ = mesh::tessellate_loops(loops, FillType::FilledAndOutlined { width: 0.02 }, &options);
    }
});
