//! Scalar fields shipped with the renderer.

use super::{MarchParams, ScalarField};
use ember_math::{BoundingBox, Vec2, Vec3};

/// Sphere of `radius` around the origin, with an exact distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereField {
    pub radius: f32,
}

impl SphereField {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.abs(),
        }
    }
}

impl ScalarField for SphereField {
    fn value(&self, p: Vec3) -> f32 {
        p.length() - self.radius
    }

    fn distance(&self, p: Vec3) -> Option<f32> {
        Some(self.value(p))
    }

    fn gradient(&self, p: Vec3) -> Option<Vec3> {
        (p != Vec3::ZERO).then(|| p.normalize())
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::centered(self.radius)
    }

    fn march_params(&self) -> MarchParams {
        MarchParams {
            max_step: 1.0,
            ..MarchParams::default()
        }
    }
}

/// Taubin's heart surface, with `z` up:
/// `(x² + 9/4 y² + z² - 1)³ - x² z³ - 9/80 y² z³`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heart;

impl ScalarField for Heart {
    fn value(&self, p: Vec3) -> f32 {
        let (x2, y2, z2) = (p.x * p.x, p.y * p.y, p.z * p.z);
        let z3 = z2 * p.z;
        let a = x2 + 2.25 * y2 + z2 - 1.0;
        a * a * a - x2 * z3 - 0.1125 * y2 * z3
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(Vec3::new(-1.5, -1.0, -1.5), Vec3::new(1.5, 1.0, 1.5))
    }

    fn march_params(&self) -> MarchParams {
        MarchParams {
            distance_multiplier: 0.5,
            max_step: 0.05,
            ..MarchParams::default()
        }
    }
}

/// Tangle cube: `x⁴ - 5x² + y⁴ - 5y² + z⁴ - 5z² + 11.8`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tangle;

impl ScalarField for Tangle {
    fn value(&self, p: Vec3) -> f32 {
        let quartic = |c: f32| {
            let c2 = c * c;
            c2 * c2 - 5.0 * c2
        };
        quartic(p.x) + quartic(p.y) + quartic(p.z) + 11.8
    }

    fn gradient(&self, p: Vec3) -> Option<Vec3> {
        Some(4.0 * p * p * p - 10.0 * p)
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::centered(3.0)
    }
}

/// Decocube: three rounded square tubes joined at the cube edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoCube;

impl DecoCube {
    const A2: f32 = 0.64;
    const OFFSET: f32 = 0.02;
}

impl ScalarField for DecoCube {
    fn value(&self, p: Vec3) -> f32 {
        let (x2, y2, z2) = (p.x * p.x, p.y * p.y, p.z * p.z);
        let term = |a: f32, b: f32, c: f32| {
            let ring = a + b - Self::A2;
            let slab = c - 1.0;
            ring * ring + slab * slab
        };
        term(x2, y2, z2) * term(y2, z2, x2) * term(z2, x2, y2) - Self::OFFSET
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::centered(1.5)
    }

    fn march_params(&self) -> MarchParams {
        MarchParams {
            distance_multiplier: 0.5,
            max_step: 0.02,
            ..MarchParams::default()
        }
    }
}

/// Torus around the `y` axis with an exact distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusField {
    pub major: f32,
    pub minor: f32,
}

impl TorusField {
    pub fn new(major: f32, minor: f32) -> Self {
        Self {
            major: major.abs(),
            minor: minor.abs(),
        }
    }
}

impl ScalarField for TorusField {
    fn value(&self, p: Vec3) -> f32 {
        let ring = Vec2::new(p.x, p.z).length() - self.major;
        Vec2::new(ring, p.y).length() - self.minor
    }

    fn distance(&self, p: Vec3) -> Option<f32> {
        Some(self.value(p))
    }

    fn gradient(&self, p: Vec3) -> Option<Vec3> {
        let rho = Vec2::new(p.x, p.z).length();
        if rho == 0.0 {
            return None;
        }
        let scale = 1.0 - self.major / rho;
        Some(Vec3::new(p.x * scale, p.y, p.z * scale))
    }

    fn bounds(&self) -> BoundingBox {
        let r = self.major + self.minor;
        BoundingBox::from_points(Vec3::new(-r, -self.minor, -r), Vec3::new(r, self.minor, r))
    }

    fn march_params(&self) -> MarchParams {
        MarchParams {
            max_step: 1.0,
            ..MarchParams::default()
        }
    }
}
