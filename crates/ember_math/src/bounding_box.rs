use crate::{Ray, Vec3};

/// Axis-aligned bounding box given by its two extreme corners.
///
/// Implicit surfaces use it to restrict ray marching to the span of the ray
/// that can possibly contain the surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

/// Below this magnitude a direction component counts as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-12;

impl BoundingBox {
    /// Create a box from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A cube of half-width `half_extent` around the origin.
    pub fn centered(half_extent: f32) -> Self {
        let h = Vec3::splat(half_extent.abs());
        Self { min: -h, max: h }
    }

    /// Slab test.
    ///
    /// Returns the entry and exit parameters `(t0, t1)` of the ray's line
    /// through the box. `t0` is negative when the origin is inside. `None` when
    /// the slabs do not overlap (`t0 > t1`) or the box is entirely behind the
    /// ray.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t0 = f32::NEG_INFINITY;
        let mut t1 = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() < PARALLEL_EPSILON {
                // Parallel: either always inside this slab or never
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut near = (lo - origin) * inv;
            let mut far = (hi - origin) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut near, &mut far);
            }
            t0 = t0.max(near);
            t1 = t1.min(far);
        }

        if t0 > t1 || t1 < 0.0 {
            return None;
        }
        Some((t0, t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_from_points_orders_corners() {
        let b = BoundingBox::from_points(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0));

        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_box_intersect_from_outside() {
        let b = BoundingBox::centered(2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0));

        let (t0, t1) = b.intersect(&ray).unwrap();
        assert!((t0 - 8.0).abs() < 1e-5);
        assert!((t1 - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_intersect_from_inside() {
        let b = BoundingBox::centered(2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));

        let (t0, t1) = b.intersect(&ray).unwrap();
        assert!(t0 < 0.0);
        assert!((t1 - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_miss() {
        let b = BoundingBox::centered(1.0);

        // Pointing away
        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(b.intersect(&away).is_none());

        // Parallel to the x slabs, outside them
        let parallel = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.intersect(&parallel).is_none());

        // Passing diagonally beside the box
        let beside = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::new(1.0, 0.1, 0.0));
        assert!(b.intersect(&beside).is_none());
    }
}
