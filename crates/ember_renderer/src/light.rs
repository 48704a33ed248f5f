//! Light sources.

use crate::{hit::Hit, world::World};
use ember_math::{Color, Ray, Vec3};

/// A light that contributes direct illumination.
pub trait Light: Send + Sync {
    /// Incident radiance at the hit point.
    fn radiance(&self, hit: &Hit) -> Color;

    /// Unit direction from the hit point toward the light.
    fn direction(&self, hit: &Hit) -> Vec3;

    fn casts_shadows(&self) -> bool {
        false
    }

    /// Whether something blocks `shadow_ray` before it reaches the light.
    fn in_shadow(&self, _world: &World, _shadow_ray: &Ray) -> bool {
        false
    }
}

/// Constant light from every direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ambient {
    pub color: Color,
    pub ls: f32,
}

impl Ambient {
    pub fn new(color: Color, ls: f32) -> Self {
        Self { color, ls }
    }

    pub fn radiance(&self) -> Color {
        self.color * self.ls
    }
}

impl Default for Ambient {
    fn default() -> Self {
        Self::new(Color::ONE, 1.0)
    }
}

impl Light for Ambient {
    fn radiance(&self, _hit: &Hit) -> Color {
        Ambient::radiance(self)
    }

    fn direction(&self, hit: &Hit) -> Vec3 {
        hit.normal
    }
}

/// Light arriving along a single direction from infinitely far away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Directional {
    pub color: Color,
    pub ls: f32,
    /// Direction the light travels in
    pub dir: Vec3,
    pub shadows: bool,
}

impl Directional {
    pub fn new(color: Color, ls: f32, dir: Vec3, shadows: bool) -> Self {
        Self {
            color,
            ls,
            dir,
            shadows,
        }
    }
}

impl Light for Directional {
    fn radiance(&self, _hit: &Hit) -> Color {
        self.color * self.ls
    }

    fn direction(&self, _hit: &Hit) -> Vec3 {
        -self.dir.normalize_or_zero()
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, world: &World, shadow_ray: &Ray) -> bool {
        world.occluded(shadow_ray, f32::INFINITY)
    }
}

/// Point light without falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub ls: f32,
    pub location: Vec3,
    pub shadows: bool,
}

impl PointLight {
    pub fn new(color: Color, ls: f32, location: Vec3, shadows: bool) -> Self {
        Self {
            color,
            ls,
            location,
            shadows,
        }
    }
}

impl Light for PointLight {
    fn radiance(&self, _hit: &Hit) -> Color {
        self.color * self.ls
    }

    fn direction(&self, hit: &Hit) -> Vec3 {
        (self.location - hit.point).normalize_or_zero()
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, world: &World, shadow_ray: &Ray) -> bool {
        let length = shadow_ray.direction.length();
        if length == 0.0 {
            return false;
        }
        // Blockers count only between the surface and the light
        let distance = (self.location - shadow_ray.origin).length() / length;
        world.occluded(shadow_ray, distance)
    }
}
