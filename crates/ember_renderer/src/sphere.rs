//! Analytic sphere primitive.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::{
    hit::{GeometricObject, Hit},
    Material,
};
use ember_math::{Interval, Ray, Vec3};

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y, phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }

    /// Nearest root of the ray/sphere quadratic inside `ray_t`.
    fn root(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        [(h - sqrtd) / a, (h + sqrtd) / a]
            .into_iter()
            .find(|&root| ray_t.surrounds(root))
    }
}

impl GeometricObject for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let t = self.root(ray, ray_t)?;
        let local_point = ray.at(t) - self.center;
        let outward_normal = local_point / self.radius;
        let (u, v) = Self::get_sphere_uv(outward_normal);

        Some(Hit::new(ray, t, local_point, outward_normal, self.material.as_ref()).with_uv(u, v))
    }

    fn hit_t(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        self.root(ray, ray_t)
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
