//! Triangle mesh geometry for Ember scene descriptions.
//!
//! Meshes are loaded from OFF files (see [`crate::off`]) and expanded into
//! individual triangles by the renderer.

use ember_math::{BoundingBox, Vec3};

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: BoundingBox,
}

impl Mesh {
    /// Create a new mesh from positions and triangle indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> BoundingBox {
        let Some(first) = positions.first() else {
            return BoundingBox::from_points(Vec3::ZERO, Vec3::ZERO);
        };

        let (min, max) = positions
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        BoundingBox::from_points(min, max)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over triangles as vertex position triples.
    ///
    /// Faces referencing a vertex that does not exist are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|face| {
            let p0 = self.positions.get(face[0] as usize)?;
            let p1 = self.positions.get(face[1] as usize)?;
            let p2 = self.positions.get(face[2] as usize)?;
            Some([*p0, *p1, *p2])
        })
    }
}
