// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: command line demo
//!
//! Builds a rounded unit square (or lays out glyphs from a typeface file),
//! tessellates it and prints mesh statistics.

use berny_core::graph::{Document, RoundAmount};
use berny_core::loader::json;
use berny_core::mesh::{self, FillType, Mesh};
use berny_core::types::Vec2;
use berny_core::FillOptions;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Filled,
    Outlined,
    FilledAndOutlined,
}

#[derive(clap::Parser, Debug)]
#[command(name = "berny-demo", version, about = "Tessellate vector shapes", long_about = None)]
struct Arguments {
    /// JSON file with fill options
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON typeface; when given, glyphs are tessellated instead of the square
    #[arg(long)]
    typeface: Option<PathBuf>,

    /// Glyph names to lay out from the typeface
    #[arg(long, value_delimiter = ',', default_value = "O")]
    glyphs: Vec<String>,

    /// What to build
    #[arg(long, value_enum, default_value_t = Mode::FilledAndOutlined)]
    fill_type: Mode,

    /// Outline width
    #[arg(long, default_value_t = 0.05)]
    width: f32,

    /// Corner radius of the square
    #[arg(long, default_value_t = 0.25)]
    radius: f32,
}

fn fill_type(args: &Arguments) -> FillType {
    match args.fill_type {
        Mode::Filled => FillType::Filled,
        Mode::Outlined => FillType::Outlined { width: args.width },
        Mode::FilledAndOutlined => FillType::FilledAndOutlined { width: args.width },
    }
}

fn run(args: &Arguments) -> Result<Mesh, Box<dyn std::error::Error>> {
    let options = match &args.config {
        Some(path) => json::options_from_reader(File::open(path)?)?,
        None => FillOptions::default(),
    };
    log::info!("options: {:?}", options);

    if let Some(path) = &args.typeface {
        let face = json::typeface_from_reader(File::open(path)?)?;
        let names: Vec<&str> = args.glyphs.iter().map(String::as_str).collect();
        let loops = face.layout(&names, Vec2::ZERO);
        return Ok(mesh::tessellate_loops(loops, fill_type(args), &options));
    }

    let mut doc = Document::new();
    let shape = doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
    let rounded = doc.round_shape(shape, RoundAmount::Radius(args.radius))?;
    let report = doc.flush_dirty()?;
    log::info!("rounded {} corners, flushed {} loops", rounded, report.loops.len());
    Ok(mesh::tessellate(&doc, shape, fill_type(args), &options)?)
}

pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = <Arguments as clap::Parser>::parse();

    match run(&args) {
        Ok(mesh) => {
            println!(
                "{} vertices, {} triangles, {} submeshes",
                mesh.vertices.len(),
                mesh.triangle_count(),
                mesh.submeshes.len()
            );
            for (i, range) in mesh.submeshes.iter().enumerate() {
                println!("  submesh {}: {} triangles", i, range.len() / 3);
            }
            for warning in &mesh.warnings {
                log::warn!("{}", warning);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
