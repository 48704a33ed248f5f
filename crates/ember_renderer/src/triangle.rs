//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::{
    hit::{GeometricObject, Hit},
    Material,
};
use ember_core::Mesh;
use ember_math::{Interval, Ray, Vec3};

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: Arc<dyn Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The face normal follows counter-clockwise winding.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self {
            v0,
            v1,
            v2,
            normal,
            material,
        }
    }

    /// Expand a mesh into triangles sharing one material.
    pub fn from_mesh(mesh: &Mesh, material: Arc<dyn Material>) -> Vec<Triangle> {
        mesh.triangles()
            .map(|[a, b, c]| Triangle::new(a, b, c, Arc::clone(&material)))
            .collect()
    }

    /// Möller-Trumbore: returns `(t, u, v)` when the ray hits inside `ray_t`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        ray_t.surrounds(t).then_some((t, u, v))
    }
}

impl GeometricObject for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let (t, u, v) = self.intersect(ray, ray_t)?;
        let point = ray.at(t);
        Some(Hit::new(ray, t, point, self.normal, self.material.as_ref()).with_uv(u, v))
    }

    fn hit_t(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        self.intersect(ray, ray_t).map(|(t, _, _)| t)
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
