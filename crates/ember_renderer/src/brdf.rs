//! Reflectance and transmittance functions used by the materials.
//!
//! `wo` is the unit direction toward the viewer, `wi` the unit direction
//! toward the light. Both point away from the surface.

use std::f32::consts::FRAC_1_PI;

use crate::hit::Hit;
use ember_math::{Color, Vec3};

/// Ideal diffuse reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    pub kd: f32,
    pub cd: Color,
}

impl Lambertian {
    pub fn new(kd: f32, cd: Color) -> Self {
        Self { kd, cd }
    }

    pub fn f(&self) -> Color {
        self.kd * self.cd * FRAC_1_PI
    }

    /// Bihemispherical reflectance.
    pub fn rho(&self) -> Color {
        self.kd * self.cd
    }
}

/// Phong specular lobe around the mirror direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlossySpecular {
    pub ks: f32,
    pub cs: Color,
    pub exp: f32,
}

impl GlossySpecular {
    pub fn new(ks: f32, cs: Color, exp: f32) -> Self {
        Self { ks, cs, exp }
    }

    pub fn f(&self, hit: &Hit, wo: Vec3, wi: Vec3) -> Color {
        let r = reflect(wi, hit.normal);
        let r_dot_wo = r.dot(wo);
        if r_dot_wo > 0.0 {
            self.ks * self.cs * r_dot_wo.powf(self.exp)
        } else {
            Color::ZERO
        }
    }
}

/// Mirror reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfectSpecular {
    pub kr: f32,
    pub cr: Color,
}

impl PerfectSpecular {
    pub fn new(kr: f32, cr: Color) -> Self {
        Self { kr, cr }
    }

    /// Mirror direction of `wo` and the reflectance toward it, already
    /// divided by `n · wi`.
    pub fn sample_f(&self, hit: &Hit, wo: Vec3) -> (Vec3, Color) {
        let wi = reflect(wo, hit.normal);
        let n_dot_wi = hit.normal.dot(wi);
        if n_dot_wi <= 0.0 {
            return (wi, Color::ZERO);
        }
        (wi, self.kr * self.cr / n_dot_wi)
    }
}

/// Refraction through a dielectric boundary.
///
/// `ior` is the index inside the object relative to outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfectTransmitter {
    pub kt: f32,
    pub ior: f32,
}

impl PerfectTransmitter {
    pub fn new(kt: f32, ior: f32) -> Self {
        Self { kt, ior }
    }

    /// Oriented normal, cosine of incidence and relative index for `wo`.
    fn orient(&self, hit: &Hit, wo: Vec3) -> (Vec3, f32, f32) {
        let n = hit.outward_normal();
        let cos_i = n.dot(wo);
        if cos_i < 0.0 {
            (-n, -cos_i, 1.0 / self.ior)
        } else {
            (n, cos_i, self.ior)
        }
    }

    /// Total internal reflection.
    pub fn tir(&self, hit: &Hit, wo: Vec3) -> bool {
        let (_, cos_i, eta) = self.orient(hit, wo);
        1.0 - (1.0 - cos_i * cos_i) / (eta * eta) < 0.0
    }

    /// Refracted direction and the transmittance along it, already divided
    /// by `|n · wt|`. Only meaningful when there is no total internal
    /// reflection.
    pub fn sample_f(&self, hit: &Hit, wo: Vec3) -> (Vec3, Color) {
        let (n, cos_i, eta) = self.orient(hit, wo);
        let cos_t = (1.0 - (1.0 - cos_i * cos_i) / (eta * eta)).max(0.0).sqrt();
        let wt = -wo / eta - (cos_t - cos_i / eta) * n;

        let n_dot_wt = n.dot(wt).abs();
        if n_dot_wt == 0.0 {
            return (wt, Color::ZERO);
        }
        (wt, Color::splat(self.kt / (eta * eta)) / n_dot_wt)
    }
}

/// Mirror `v` about `n`.
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    -v + 2.0 * n.dot(v) * n
}
