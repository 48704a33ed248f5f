//! Warps from the unit square onto the disk and the hemisphere.

use std::f32::consts::{FRAC_PI_4, TAU};

use ember_math::{Vec2, Vec3};

/// Shirley's concentric map from `[0,1)²` onto the unit disk.
///
/// Preserves the stratification of the input points.
pub fn concentric_disk(p: Vec2) -> Vec2 {
    let s = 2.0 * p - Vec2::ONE;

    let (r, phi) = if s.x > -s.y {
        if s.x > s.y {
            (s.x, s.y / s.x)
        } else {
            (s.y, 2.0 - s.x / s.y)
        }
    } else if s.x < s.y {
        (-s.x, 4.0 + s.y / s.x)
    } else if s.y != 0.0 {
        (-s.y, 6.0 - s.x / s.y)
    } else {
        (-s.y, 0.0)
    };

    let phi = phi * FRAC_PI_4;
    Vec2::new(r * phi.cos(), r * phi.sin())
}

/// Cosine-power distribution on the `+z` hemisphere with exponent `e`.
pub fn cosine_power_hemisphere(p: Vec2, e: f32) -> Vec3 {
    let phi = TAU * p.x;
    let cos_theta = (1.0 - p.y).powf(1.0 / (e + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_center_maps_to_origin() {
        let d = concentric_disk(Vec2::splat(0.5));
        assert!(d.length() < 1e-6);
    }

    #[test]
    fn test_disk_stays_in_unit_circle() {
        let steps = 17;
        for i in 0..steps {
            for j in 0..steps {
                let p = Vec2::new(i as f32 / (steps - 1) as f32, j as f32 / (steps - 1) as f32)
                    .min(Vec2::splat(0.999_999));
                let d = concentric_disk(p);
                assert!(d.is_finite());
                assert!(d.length() <= 1.0 + 1e-5, "{p:?} -> {d:?}");
            }
        }
    }

    #[test]
    fn test_disk_edge_midpoints() {
        // Square edge midpoints land on the circle along the axes
        let right = concentric_disk(Vec2::new(1.0, 0.5));
        let top = concentric_disk(Vec2::new(0.5, 1.0));
        assert!((right - Vec2::X).length() < 1e-5);
        assert!((top - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_hemisphere_points_are_unit_and_upward() {
        for &(x, y) in &[(0.0, 0.0), (0.25, 0.5), (0.9, 0.99), (0.5, 0.0)] {
            for e in [1.0, 10.0] {
                let h = cosine_power_hemisphere(Vec2::new(x, y), e);
                assert!((h.length() - 1.0).abs() < 1e-5);
                assert!(h.z >= 0.0);
            }
        }
    }
}
