// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: shape to mesh pipeline

use crate::config::FillOptions;
use crate::error::{PathError, QualityWarning};
use crate::fill::{FillLoop, FillSession, Vector2Repo};
use crate::graph::{Document, ShapeId};
use crate::types::Vec3;
use std::ops::Range;

/// What to build for a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillType {
    Filled,
    /// A ribbon of the given width centred on the shape's loops.
    Outlined { width: f32 },
    /// Fill and outline as two submeshes sharing one vertex buffer.
    FilledAndOutlined { width: f32 },
}

/// An indexed triangle mesh.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    /// Vertex positions, z = 0
    pub vertices: Vec<Vec3>,
    /// Index buffer (triples)
    pub indices: Vec<u32>,
    /// Index ranges of each submesh, in build order
    pub submeshes: Vec<Range<usize>>,
    /// Problems met while building
    pub warnings: Vec<QualityWarning>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Tessellate one shape of a document.
///
/// The caller is expected to have flushed the document; stale caches do
/// not change the result but are logged.
pub fn tessellate(doc: &Document, shape: ShapeId, fill: FillType, options: &FillOptions) -> Result<Mesh, PathError> {
    let mut session = FillSession::with_options(*options);
    session.extract_fill_loops(doc, shape)?;
    Ok(tessellate_session(session, fill))
}

/// Tessellate detached loops, such as laid-out glyphs.
pub fn tessellate_loops(loops: Vec<FillLoop>, fill: FillType, options: &FillOptions) -> Mesh {
    let mut session = FillSession::with_options(*options);
    session.extract_loops(loops);
    tessellate_session(session, fill)
}

fn tessellate_session(mut session: FillSession, fill: FillType) -> Mesh {
    let options = *session.options();
    let mut repo = Vector2Repo::with_tolerance(options.repo_tolerance);
    let mut mesh = Mesh::default();
    let mut triangles = |session: &mut FillSession, mesh: &mut Mesh| {
        let start = mesh.indices.len();
        session.get_triangles(
            &mut mesh.indices,
            &mut repo,
            options.flatten_curves,
            options.winding_requirement,
            options.consistent_winding,
        );
        mesh.submeshes.push(start..mesh.indices.len());
        mesh.warnings.extend(session.take_warnings());
    };

    match fill {
        FillType::Filled => triangles(&mut session, &mut mesh),
        FillType::Outlined { width } => {
            session.make_outline_bridged(width);
            triangles(&mut session, &mut mesh);
        }
        FillType::FilledAndOutlined { width } => {
            let mut outline = session.clone();
            triangles(&mut session, &mut mesh);
            outline.make_outline_bridged(width);
            triangles(&mut outline, &mut mesh);
        }
    }
    mesh.vertices = repo.get_vector3_array();
    log::debug!(
        "mesh has {} vertices, {} triangles in {} submeshes",
        mesh.vertices.len(),
        mesh.triangle_count(),
        mesh.submeshes.len()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec2;

    #[test]
    fn triangulate_rectangle() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let mesh = tessellate(&doc, shape, FillType::Filled, &FillOptions::default()).unwrap();
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.submeshes, vec![0..6]);
    }

    #[test]
    fn fill_and_outline_share_vertices() {
        let mut doc = Document::new();
        let shape = doc.add_rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let mesh = tessellate(
            &doc,
            shape,
            FillType::FilledAndOutlined { width: 0.1 },
            &FillOptions::default(),
        )
        .unwrap();
        assert_eq!(mesh.submeshes.len(), 2);
        assert_eq!(mesh.submeshes[0], 0..6);
        assert_eq!(mesh.submeshes[1].start, 6);
        assert!(mesh.submeshes[1].end > 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert!(mesh.vertices.iter().all(|v| v.z == 0.0));
    }

    #[test]
    fn unknown_shape_fails() {
        let doc = Document::new();
        let err = tessellate(&doc, ShapeId(3), FillType::Filled, &FillOptions::default());
        assert_eq!(err.unwrap_err(), PathError::UnknownShape(ShapeId(3)));
    }
}
