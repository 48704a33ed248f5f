//! Implicit surfaces: the zero set of a scalar field, found by ray marching.
//!
//! The march is confined to the span of the ray inside the field's bounding
//! box. Each step advances by a distance estimate (exact when the field
//! provides one, otherwise `|f| / |f'|` along the ray), clamped to
//! `[min_step, max_step]`. A sign change between consecutive samples is
//! refined by a fixed number of bisection steps.

mod fields;

pub use fields::{DecoCube, Heart, SphereField, Tangle, TorusField};

use std::sync::Arc;

use crate::{
    hit::{GeometricObject, Hit},
    Material,
};
use ember_core::MarchOverrides;
use ember_math::{BoundingBox, Interval, Ray, Vec3};

/// A scalar field whose zero set is a renderable surface.
pub trait ScalarField: Send + Sync {
    /// Field value at a point in local space. Negative is inside.
    fn value(&self, p: Vec3) -> f32;

    /// Exact distance to the surface, when the field knows it.
    fn distance(&self, _p: Vec3) -> Option<f32> {
        None
    }

    /// Closed-form gradient, when the field knows it.
    fn gradient(&self, _p: Vec3) -> Option<Vec3> {
        None
    }

    /// Local-space box that contains the whole surface.
    fn bounds(&self) -> BoundingBox;

    /// Marching parameters tuned for this field.
    fn march_params(&self) -> MarchParams {
        MarchParams::default()
    }
}

/// Tuning for the ray march. Distances are in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchParams {
    /// Scale applied to every distance estimate
    pub distance_multiplier: f32,
    pub min_step: f32,
    pub max_step: f32,
    /// Estimates below this count as a hit
    pub trigger_distance: f32,
    /// Halvings of a bracketed root
    pub bisection_depth: u32,
    /// Offset of the first sample when the ray starts inside the box
    pub start_epsilon: f32,
    /// Half-width of the centered difference along the ray
    pub derivative_step: f32,
    /// Step of the forward-difference normal
    pub normal_epsilon: f32,
    pub max_iterations: u32,
}

const DEFAULT_MIN_STEP: f32 = 1e-3;

impl Default for MarchParams {
    fn default() -> Self {
        Self {
            distance_multiplier: 1.0,
            min_step: DEFAULT_MIN_STEP,
            max_step: 0.1,
            trigger_distance: 1e-4,
            bisection_depth: 4,
            start_epsilon: 0.01,
            derivative_step: 1e-3,
            normal_epsilon: 1e-3,
            max_iterations: 100_000,
        }
    }
}

impl MarchParams {
    /// Overlay values set in a scene file.
    pub fn apply(mut self, overrides: &MarchOverrides) -> Self {
        if let Some(v) = overrides.distance_multiplier {
            self.distance_multiplier = v;
        }
        if let Some(v) = overrides.min_step {
            self.min_step = v;
        }
        if let Some(v) = overrides.max_step {
            self.max_step = v;
        }
        if let Some(v) = overrides.trigger_distance {
            self.trigger_distance = v;
        }
        if let Some(v) = overrides.bisection_depth {
            self.bisection_depth = v;
        }
        self.sanitized()
    }

    /// Force a positive minimum step so the march always makes progress.
    fn sanitized(mut self) -> Self {
        if self.min_step.is_nan() || self.min_step <= 0.0 {
            self.min_step = DEFAULT_MIN_STEP;
        }
        if self.max_step.is_nan() || self.max_step < self.min_step {
            self.max_step = self.min_step;
        }
        if self.distance_multiplier.is_nan() || self.distance_multiplier <= 0.0 {
            self.distance_multiplier = 1.0;
        }
        self
    }
}

/// A surface defined by a scalar field, placed at `center`.
pub struct ImplicitSurface<F> {
    field: F,
    center: Vec3,
    bounds: BoundingBox,
    params: MarchParams,
    material: Arc<dyn Material>,
}

impl<F: ScalarField> ImplicitSurface<F> {
    pub fn new(field: F, center: Vec3, material: Arc<dyn Material>) -> Self {
        let bounds = field.bounds();
        let params = field.march_params().sanitized();
        Self {
            field,
            center,
            bounds,
            params,
            material,
        }
    }

    /// Replace the marching parameters.
    pub fn with_params(mut self, params: MarchParams) -> Self {
        self.params = params.sanitized();
        self
    }

    pub fn params(&self) -> &MarchParams {
        &self.params
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// Distance estimate at `p` for a ray with unit direction `dir`.
    ///
    /// `None` for non-finite fields. Infinite estimates are later clamped to
    /// `max_step`.
    fn estimate(&self, p: Vec3, dir: Vec3, value: f32) -> Option<f32> {
        if let Some(distance) = self.field.distance(p) {
            return (!distance.is_nan()).then_some(distance.abs());
        }
        if value == 0.0 {
            return Some(0.0);
        }

        let h = self.params.derivative_step;
        let ahead = self.field.value(p + dir * h);
        let behind = self.field.value(p - dir * h);
        let derivative = (ahead - behind) / (2.0 * h);

        let estimate = value.abs() / derivative.abs();
        (!estimate.is_nan()).then_some(estimate)
    }

    /// Narrow a bracketed sign change and return its lower bound.
    fn bisect(&self, ray: &Ray, mut lo: f32, mut hi: f32, mut lo_value: f32) -> f32 {
        for _ in 0..self.params.bisection_depth {
            let mid = 0.5 * (lo + hi);
            let mid_value = self.field.value(ray.at(mid));
            if (lo_value < 0.0) != (mid_value < 0.0) {
                hi = mid;
            } else {
                lo = mid;
                lo_value = mid_value;
            }
        }
        lo
    }

    /// March a local-space ray. Returns the ray parameter of the surface.
    fn march(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let dir_len = ray.direction.length();
        if dir_len == 0.0 || !dir_len.is_finite() {
            return None;
        }
        let dir = ray.direction / dir_len;

        let (t0, t1) = self.bounds.intersect(ray)?;
        let inside = t0 < 0.0;
        let start = if inside {
            self.params.start_epsilon / dir_len
        } else {
            t0
        };

        let mut t = start.max(ray_t.min);
        let t_end = t1.min(ray_t.max);
        if t > t_end {
            return None;
        }

        let mut value = self.field.value(ray.at(t));
        if value.is_nan() {
            return None;
        }

        let params = &self.params;
        for i in 0..params.max_iterations {
            let estimate = self.estimate(ray.at(t), dir, value)?;

            // A ray leaving the surface must not report its own origin
            if !(inside && i == 0) && estimate < params.trigger_distance {
                return Some(t);
            }
            if t >= t_end {
                return None;
            }

            let step = (estimate * params.distance_multiplier).clamp(params.min_step, params.max_step)
                / dir_len;
            let next_t = (t + step).min(t_end);
            let next_value = self.field.value(ray.at(next_t));
            if next_value.is_nan() {
                return None;
            }

            if (value < 0.0) != (next_value < 0.0) {
                return Some(self.bisect(ray, t, next_t, value));
            }

            t = next_t;
            value = next_value;
        }

        None
    }

    /// Unit outward normal at a local-space point.
    fn normal_at(&self, p: Vec3, dir: Vec3) -> Vec3 {
        let gradient = self.field.gradient(p).unwrap_or_else(|| {
            let e = self.params.normal_epsilon;
            let f = self.field.value(p);
            Vec3::new(
                self.field.value(p + Vec3::X * e) - f,
                self.field.value(p + Vec3::Y * e) - f,
                self.field.value(p + Vec3::Z * e) - f,
            ) / e
        });

        let normal = gradient.normalize_or_zero();
        if normal == Vec3::ZERO || !normal.is_finite() {
            -dir.normalize_or_zero()
        } else {
            normal
        }
    }
}

impl<F: ScalarField> GeometricObject for ImplicitSurface<F> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let local = ray.translated(self.center);
        let t = self.march(&local, ray_t)?;
        if !ray_t.surrounds(t) {
            return None;
        }

        let local_point = local.at(t);
        let normal = self.normal_at(local_point, local.direction);
        Some(Hit::new(ray, t, local_point, normal, self.material.as_ref()))
    }

    fn hit_t(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        self.march(&ray.translated(self.center), ray_t)
            .filter(|&t| ray_t.surrounds(t))
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Matte;
    use ember_math::Color;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Matte::new(0.25, 0.75, Color::splat(0.5)))
    }

    fn sphere(radius: f32) -> ImplicitSurface<SphereField> {
        ImplicitSurface::new(SphereField::new(radius), Vec3::ZERO, grey())
    }

    #[test]
    fn test_implicit_sphere_hit_from_outside() {
        let surface = sphere(2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);

        let hit = surface.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((hit.t - 8.0).abs() < 1e-2);
        assert!(hit.front_face);
        assert!((hit.normal - Vec3::NEG_Z).length() < 1e-2);
    }

    #[test]
    fn test_implicit_sphere_hit_from_inside() {
        let surface = sphere(2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let hit = surface.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((hit.t - 2.0).abs() < 0.1);
        assert!(!hit.front_face);
        assert!(hit.normal.dot(ray.direction) < 0.0);
    }

    #[test]
    fn test_implicit_miss_when_pointing_away() {
        let surface = sphere(2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::NEG_Z);

        assert!(surface.hit(&ray, Interval::from_min(0.001)).is_none());
        assert!(surface.hit_t(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_implicit_miss_beside_the_surface() {
        let surface = sphere(1.0);
        // Inside the box corner region but outside the sphere
        let ray = Ray::new(Vec3::new(0.95, 0.95, -10.0), Vec3::Z);

        assert!(surface.hit(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_implicit_zero_direction_is_a_miss() {
        let surface = sphere(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO);

        assert!(surface.hit(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_implicit_unnormalized_direction() {
        let surface = sphere(2.0);
        // Twice the length: same surface point at half the parameter
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 2.0));

        let hit = surface.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-2);
    }

    #[test]
    fn test_implicit_center_offset() {
        let surface = ImplicitSurface::new(SphereField::new(1.0), Vec3::new(5.0, 0.0, 0.0), grey());
        let ray = Ray::new(Vec3::new(5.0, 0.0, -10.0), Vec3::Z);

        let hit = surface.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((hit.t - 9.0).abs() < 1e-2);
        assert!((hit.point - Vec3::new(5.0, 0.0, -1.0)).length() < 1e-2);
        assert!((hit.local_point - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-2);
    }

    #[test]
    fn test_implicit_respects_interval_max() {
        let surface = sphere(2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);

        assert!(surface.hit_t(&ray, Interval::new(0.001, 5.0)).is_none());
    }

    #[test]
    fn test_tangle_hit_by_sign_change() {
        let surface = ImplicitSurface::new(Tangle, Vec3::ZERO, grey());
        // The axes pass through the holes, so aim at a lobe
        let ray = Ray::new(Vec3::new(1.5, 1.5, -10.0), Vec3::Z);

        let hit = surface.hit(&ray, Interval::from_min(0.001)).unwrap();
        // The field is negative just inside the hit
        let inside = hit.local_point + Vec3::Z * 0.05;
        assert!(surface.field().value(inside) < 0.0);
        assert!((hit.point.z + 2.261).abs() < 0.02);
        assert!(hit.normal.z < 0.0);
    }

    #[test]
    fn test_torus_hole_is_a_miss() {
        let surface = ImplicitSurface::new(TorusField::new(1.0, 0.25), Vec3::ZERO, grey());
        let through_hole = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        let through_tube = Ray::new(Vec3::new(1.0, 10.0, 0.0), Vec3::NEG_Y);

        assert!(surface.hit(&through_hole, Interval::from_min(0.001)).is_none());
        let hit = surface.hit(&through_tube, Interval::from_min(0.001)).unwrap();
        assert!((hit.t - 9.75).abs() < 1e-2);
    }

    #[test]
    fn test_march_params_overrides() {
        let overrides = MarchOverrides {
            min_step: Some(-1.0),
            bisection_depth: Some(8),
            ..Default::default()
        };
        let params = MarchParams::default().apply(&overrides);

        assert!(params.min_step > 0.0);
        assert_eq!(params.bisection_depth, 8);
        assert!(params.max_step >= params.min_step);
    }

    #[test]
    fn test_bisection_depth_budget() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        // Bracket around the root at t = 8
        let (lo, hi) = (7.5, 8.25);
        let with_depth = |depth| {
            sphere(2.0).with_params(MarchParams {
                bisection_depth: depth,
                ..MarchParams::default()
            })
        };

        let lo_value = SphereField::new(2.0).value(ray.at(lo));
        assert_eq!(with_depth(0).bisect(&ray, lo, hi, lo_value), lo);

        let mut previous_error = f32::INFINITY;
        for depth in 0..=16 {
            let t = with_depth(depth).bisect(&ray, lo, hi, lo_value);
            assert!(t <= 8.0);
            let error = 8.0 - t;
            assert!(error <= previous_error);
            previous_error = error;
        }
        assert!(previous_error < 1e-4);
    }
}
