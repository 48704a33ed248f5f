//! Materials: how a surface turns incident light into outgoing radiance.

use crate::{
    brdf::{GlossySpecular, Lambertian, PerfectSpecular, PerfectTransmitter},
    hit::Hit,
    tracer::ShadeContext,
};
use ember_math::{Color, Ray, Vec3};

/// Trait for surface materials.
pub trait Material: Send + Sync {
    /// Radiance leaving the hit point toward the ray origin.
    fn shade(&self, ctx: &ShadeContext, hit: &Hit) -> Color;

    /// Unlit color for flat previews.
    fn flat_color(&self) -> Color;
}

/// Ambient term plus the unshadowed direct light from every light,
/// weighted by `brdf(wo, wi)`.
fn direct_lighting<F>(ctx: &ShadeContext, hit: &Hit, ambient: &Lambertian, brdf: F) -> Color
where
    F: Fn(Vec3, Vec3) -> Color,
{
    let wo = ctx.wo();
    let mut l = ambient.rho() * ctx.world.ambient.radiance();

    for light in ctx.world.lights() {
        let wi = light.direction(hit);
        let n_dot_wi = hit.normal.dot(wi);
        if n_dot_wi <= 0.0 {
            continue;
        }

        if light.casts_shadows() && light.in_shadow(ctx.world, &Ray::new(hit.point, wi)) {
            continue;
        }

        l += brdf(wo, wi) * light.radiance(hit) * n_dot_wi;
    }

    l
}

/// Ambient and Lambertian diffuse reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matte {
    ambient: Lambertian,
    diffuse: Lambertian,
}

impl Matte {
    pub fn new(ka: f32, kd: f32, cd: Color) -> Self {
        Self {
            ambient: Lambertian::new(ka, cd),
            diffuse: Lambertian::new(kd, cd),
        }
    }
}

impl Material for Matte {
    fn shade(&self, ctx: &ShadeContext, hit: &Hit) -> Color {
        direct_lighting(ctx, hit, &self.ambient, |_, _| self.diffuse.f())
    }

    fn flat_color(&self) -> Color {
        self.diffuse.cd
    }
}

/// Matte plus a glossy highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phong {
    ambient: Lambertian,
    diffuse: Lambertian,
    specular: GlossySpecular,
}

impl Phong {
    pub fn new(ka: f32, kd: f32, cd: Color, ks: f32, exp: f32) -> Self {
        Self {
            ambient: Lambertian::new(ka, cd),
            diffuse: Lambertian::new(kd, cd),
            specular: GlossySpecular::new(ks, Color::ONE, exp),
        }
    }
}

impl Material for Phong {
    fn shade(&self, ctx: &ShadeContext, hit: &Hit) -> Color {
        direct_lighting(ctx, hit, &self.ambient, |wo, wi| {
            self.diffuse.f() + self.specular.f(hit, wo, wi)
        })
    }

    fn flat_color(&self) -> Color {
        self.diffuse.cd
    }
}

/// Phong plus a recursive mirror reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflective {
    phong: Phong,
    mirror: PerfectSpecular,
}

impl Reflective {
    pub fn new(phong: Phong, kr: f32, cr: Color) -> Self {
        Self {
            phong,
            mirror: PerfectSpecular::new(kr, cr),
        }
    }
}

impl Material for Reflective {
    fn shade(&self, ctx: &ShadeContext, hit: &Hit) -> Color {
        let mut l = self.phong.shade(ctx, hit);
        if !ctx.can_recurse() {
            return l;
        }

        let (wi, fr) = self.mirror.sample_f(hit, ctx.wo());
        let reflected = Ray::new(hit.point, wi);
        l += fr * ctx.trace(&reflected) * hit.normal.dot(wi);
        l
    }

    fn flat_color(&self) -> Color {
        self.phong.flat_color()
    }
}

/// Phong plus mirror reflection and refraction.
///
/// Under total internal reflection all of the secondary energy goes to the
/// reflected ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transparent {
    phong: Phong,
    mirror: PerfectSpecular,
    transmitter: PerfectTransmitter,
}

impl Transparent {
    pub fn new(phong: Phong, kr: f32, cr: Color, kt: f32, ior: f32) -> Self {
        Self {
            phong,
            mirror: PerfectSpecular::new(kr, cr),
            transmitter: PerfectTransmitter::new(kt, ior),
        }
    }
}

impl Material for Transparent {
    fn shade(&self, ctx: &ShadeContext, hit: &Hit) -> Color {
        let mut l = self.phong.shade(ctx, hit);
        if !ctx.can_recurse() {
            return l;
        }

        let wo = ctx.wo();
        let (wi, fr) = self.mirror.sample_f(hit, wo);
        let reflected = Ray::new(hit.point, wi);

        if self.transmitter.tir(hit, wo) {
            l += ctx.trace(&reflected);
        } else {
            let (wt, ft) = self.transmitter.sample_f(hit, wo);
            let transmitted = Ray::new(hit.point, wt);
            l += fr * ctx.trace(&reflected) * hit.normal.dot(wi);
            l += ft * ctx.trace(&transmitted) * hit.normal.dot(wt).abs();
        }
        l
    }

    fn flat_color(&self) -> Color {
        self.phong.flat_color()
    }
}

/// Constant radiance, unaffected by lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emissive {
    pub ls: f32,
    pub ce: Color,
}

impl Emissive {
    pub fn new(ls: f32, ce: Color) -> Self {
        Self { ls, ce }
    }
}

impl Material for Emissive {
    fn shade(&self, _ctx: &ShadeContext, _hit: &Hit) -> Color {
        self.ls * self.ce
    }

    fn flat_color(&self) -> Color {
        self.ce
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        light::{Ambient, Directional},
        sphere::Sphere,
        tracer::{RayCast, Tracer, Whitted},
        world::World,
    };
    use std::sync::Arc;

    /// A unit sphere at the origin lit from straight above.
    fn lit_world(material: Arc<dyn Material>, shadows: bool) -> World {
        let mut world = World::new();
        world.ambient = Ambient::new(Color::ONE, 0.5);
        world.add_object(Box::new(Sphere::new(Vec3::ZERO, 1.0, material)));
        world.add_light(Box::new(Directional::new(Color::ONE, 2.0, Vec3::NEG_Y, shadows)));
        world
    }

    fn shade_top(world: &World, tracer: &dyn Tracer) -> Color {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        tracer.trace_ray(world, &ray, 0)
    }

    #[test]
    fn test_matte_direct_lighting() {
        let world = lit_world(Arc::new(Matte::new(0.2, 0.6, Color::ONE)), false);
        let color = shade_top(&world, &Whitted::new(5));

        // ambient 0.2 * 0.5 plus diffuse 0.6 / pi * 2
        let expected = 0.1 + 1.2 / std::f32::consts::PI;
        assert!((color.x - expected).abs() < 1e-4, "{color:?}");
    }

    #[test]
    fn test_shadowed_point_gets_only_ambient() {
        let mut world = lit_world(Arc::new(Matte::new(0.2, 0.6, Color::ONE)), true);
        // Blocker between the light and the top of the sphere
        world.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 3.0, 0.0),
            0.5,
            Arc::new(Matte::new(0.2, 0.6, Color::ONE)),
        )));

        // Camera ray that passes beside the blocker
        let ray = Ray::new(Vec3::new(3.0, 4.0, 0.0), Vec3::new(-1.0, -1.0, 0.0));
        let hit = world.hit_objects(&ray).unwrap();
        assert!((hit.point - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-4);

        let color = Whitted::new(5).trace_ray(&world, &ray, 0);
        assert!((color.x - 0.1).abs() < 1e-4, "{color:?}");
    }

    #[test]
    fn test_reflective_picks_up_the_background() {
        let phong = Phong::new(0.0, 0.0, Color::ZERO, 0.0, 1.0);
        let mut world = lit_world(Arc::new(Reflective::new(phong, 1.0, Color::ONE)), false);
        world.background = Color::new(0.2, 0.4, 0.6);

        let whitted = shade_top(&world, &Whitted::new(5));
        assert!((whitted - world.background).length() < 1e-4, "{whitted:?}");

        // No secondary rays without recursion
        let raycast = shade_top(&world, &RayCast);
        assert!(raycast.length() < 1e-6);
    }

    #[test]
    fn test_emissive_ignores_lights() {
        let world = lit_world(Arc::new(Emissive::new(3.0, Color::new(1.0, 0.5, 0.0))), false);
        let color = shade_top(&world, &Whitted::new(5));
        assert_eq!(color, Color::new(3.0, 1.5, 0.0));
    }
}
