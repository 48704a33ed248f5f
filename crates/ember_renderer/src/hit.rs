//! Intersection records and the trait every renderable object implements.

use crate::Material;
use ember_math::{Interval, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// Returned by value from [`GeometricObject::hit`]; a miss is `None`, so
/// nothing here is ever read for a ray that hit nothing.
#[derive(Clone, Copy)]
pub struct Hit<'a> {
    /// Ray parameter of the intersection
    pub t: f32,
    /// Intersection point in world space
    pub point: Vec3,
    /// Intersection point in the object's own space
    pub local_point: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
    /// Surface parameters
    pub u: f32,
    pub v: f32,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> Hit<'a> {
    /// Build a hit record, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        local_point: Vec3,
        outward_normal: Vec3,
        material: &'a dyn Material,
    ) -> Self {
        // If the ray and normal point in the same direction, we're inside
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            t,
            point: ray.at(t),
            local_point,
            normal,
            front_face,
            u: 0.0,
            v: 0.0,
            material,
        }
    }

    /// Attach surface parameters.
    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.u = u;
        self.v = v;
        self
    }

    /// The geometric normal pointing out of the surface, regardless of which
    /// side the ray came from.
    pub fn outward_normal(&self) -> Vec3 {
        if self.front_face {
            self.normal
        } else {
            -self.normal
        }
    }
}

impl std::fmt::Debug for Hit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hit")
            .field("t", &self.t)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("front_face", &self.front_face)
            .finish_non_exhaustive()
    }
}

/// Trait for objects that can be hit by rays.
pub trait GeometricObject: Send + Sync {
    /// Nearest intersection with parameter strictly inside `ray_t`.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>>;

    /// Parameter of the nearest intersection inside `ray_t`, without any
    /// shading data. Used for shadow and unlit queries.
    fn hit_t(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        self.hit(ray, ray_t).map(|hit| hit.t)
    }

    /// The material shared by the whole object.
    fn material(&self) -> &dyn Material;
}
