// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: JSON typeface and options loader
//!
//! Typeface layout:
//!
//! ```json
//! { "name": "Demo", "units_per_em": 1000,
//!   "glyphs": [ { "name": "O", "advance": 600,
//!                 "contours": [ [[x, y, 1], [x, y, 0], ...], ... ] } ] }
//! ```
//!
//! A point is `[x, y]` or `[x, y, on]`, or an object with `x`, `y` and an
//! optional `on` flag. Points are on the curve unless `on` is `0`/`false`.

use crate::config::FillOptions;
use crate::error::LoadError;
use crate::font::{Contour, ContourPoint, Glyph, Typeface};
use crate::types::Vec2;
use serde_json::Value;
use std::io::Read;

/// Load a typeface from a reader containing JSON.
pub fn typeface_from_reader<R: Read>(mut reader: R) -> Result<Typeface, LoadError> {
    let mut s = String::new();
    reader.read_to_string(&mut s)?;
    let root: Value = serde_json::from_str(&s)?;
    let name = root
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let units_per_em = root
        .get("units_per_em")
        .and_then(Value::as_f64)
        .unwrap_or(1.0) as f32;
    let mut glyphs = Vec::new();
    if let Some(glyph_arr) = root.get("glyphs").and_then(Value::as_array) {
        for glyph in glyph_arr {
            glyphs.push(parse_glyph(glyph));
        }
    }
    log::debug!("loaded typeface {:?} with {} glyphs", name, glyphs.len());
    Ok(Typeface {
        name,
        units_per_em,
        glyphs,
    })
}

/// Load a typeface directly from a byte slice containing JSON.
pub fn typeface_from_slice(data: &[u8]) -> Result<Typeface, LoadError> {
    let cursor = std::io::Cursor::new(data);
    typeface_from_reader(cursor)
}

/// Load fill options from a reader. Missing fields keep their defaults.
pub fn options_from_reader<R: Read>(mut reader: R) -> Result<FillOptions, LoadError> {
    let mut s = String::new();
    reader.read_to_string(&mut s)?;
    Ok(FillOptions::from_json(&s)?)
}

fn parse_glyph(obj: &Value) -> Glyph {
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let advance = obj.get("advance").and_then(Value::as_f64).unwrap_or(0.0) as f32;
    let contours = obj
        .get("contours")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_array)
                .map(|pts| Contour {
                    points: pts.iter().filter_map(parse_point).collect(),
                })
                .collect()
        })
        .unwrap_or_default();
    Glyph {
        name,
        advance,
        contours,
    }
}

fn parse_point(v: &Value) -> Option<ContourPoint> {
    let flag = |f: &Value| match f {
        Value::Bool(b) => *b,
        other => other.as_f64().map_or(true, |n| n != 0.0),
    };
    if let Some(arr) = v.as_array() {
        if arr.len() < 2 {
            return None;
        }
        let x = arr[0].as_f64()? as f32;
        let y = arr[1].as_f64()? as f32;
        let on_curve = arr.get(2).map_or(true, flag);
        return Some(ContourPoint {
            position: Vec2::new(x, y),
            on_curve,
        });
    }
    let x = v.get("x").and_then(Value::as_f64)? as f32;
    let y = v.get("y").and_then(Value::as_f64)? as f32;
    let on_curve = v.get("on").map_or(true, flag);
    Some(ContourPoint {
        position: Vec2::new(x, y),
        on_curve,
    })
}
