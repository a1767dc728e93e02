// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: fill sessions

use super::extract::extract_islands;
use super::island::{FillIsland, FillLoop};
use super::outline::outline_island;
use super::repo::Vector2Repo;
use super::triangulate::{emit_triangles, triangulate_island};
use crate::config::{FillOptions, WindingRequirement};
use crate::error::{PathError, QualityWarning};
use crate::geometry::Cubic;
use crate::graph::{Document, ShapeId};

/// Working set of islands extracted from path geometry.
///
/// A session owns its islands outright; cloning it gives an independent
/// copy, so one extraction can feed both a fill and an outline pass.
#[derive(Debug, Clone, Default)]
pub struct FillSession {
    pub islands: Vec<FillIsland>,
    options: FillOptions,
    warnings: Vec<QualityWarning>,
}

impl FillSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FillOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Non-fatal problems met so far.
    pub fn warnings(&self) -> &[QualityWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<QualityWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Extract the islands of every loop in `shape` and append them.
    /// Open loops are closed with a straight segment. Returns how many
    /// islands were added.
    pub fn extract_fill_loops(&mut self, doc: &Document, shape: ShapeId) -> Result<usize, PathError> {
        let mut loops = Vec::new();
        for &lid in doc.shape(shape)?.loops() {
            let lp = doc.get_loop(lid)?;
            if lp.is_dirty() {
                log::debug!("extracting {:?} before its caches were flushed", lid);
            }
            let mut segments = doc.loop_segments(lid)?;
            if !lp.is_closed() {
                if let (Some(first), Some(last)) = (segments.first(), segments.last()) {
                    let closing = Cubic::line(last.p3, first.p0);
                    segments.push(closing);
                }
            }
            if segments.is_empty() {
                continue;
            }
            loops.push(FillLoop::from_cubics(&segments));
        }
        Ok(self.extract_loops(loops))
    }

    /// Extract islands from detached loops and append them. Returns how
    /// many islands were added.
    pub fn extract_loops(&mut self, loops: Vec<FillLoop>) -> usize {
        let found = extract_islands(loops, &self.options, &mut self.warnings);
        log::debug!("extracted {} islands", found.len());
        let added = found.len();
        self.islands.extend(found);
        added
    }

    /// Replace every island with its bridged outline of `width`.
    pub fn make_outline_bridged(&mut self, width: f32) {
        let mut ribbons = Vec::with_capacity(self.islands.len());
        for island in &self.islands {
            ribbons.extend(outline_island(island, width, &self.options, &mut self.warnings));
        }
        self.islands = ribbons;
    }

    /// Triangulate every island, appending vertex indices from `repo` to
    /// `out`. Returns how many triangles were written.
    ///
    /// With `consistent` set every triangle has the `requirement`
    /// orientation; otherwise triangles follow their island's orientation.
    pub fn get_triangles(
        &mut self,
        out: &mut Vec<u32>,
        repo: &mut Vector2Repo,
        flatten_curves: bool,
        requirement: WindingRequirement,
        consistent: bool,
    ) -> usize {
        let mut written = 0;
        for (index, island) in self.islands.iter().enumerate() {
            let result = triangulate_island(
                island,
                self.options.flatten_tolerance,
                flatten_curves,
                self.options.snap_epsilon,
            );
            if let Some(reason) = result.fallback {
                log::warn!("island {} fell back to hull triangulation: {}", index, reason);
                self.warnings
                    .push(QualityWarning::TriangulationFallback { island: index, reason });
            }
            let count = emit_triangles(
                &result.triangles,
                island.winding,
                requirement,
                consistent,
                repo,
                out,
            );
            log::trace!("island {} gave {} triangles", index, count);
            written += count;
        }
        written
    }
}
