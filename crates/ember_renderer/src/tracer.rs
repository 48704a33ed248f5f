//! Tracers: turn a ray into a color.
//!
//! The tracer owns the recursion policy. Materials never recurse directly;
//! they ask the [`ShadeContext`] to trace secondary rays, and the tracer
//! decides whether that is allowed and when to stop.

use crate::world::World;
use ember_core::TracerKind;
use ember_math::{Color, Ray, Vec3};

/// Everything a material may consult while shading one hit.
#[derive(Clone, Copy)]
pub struct ShadeContext<'a> {
    pub world: &'a World,
    pub tracer: &'a dyn Tracer,
    /// The ray that produced the hit
    pub ray: Ray,
    pub depth: u32,
    recursion: bool,
}

impl<'a> ShadeContext<'a> {
    pub fn new(world: &'a World, tracer: &'a dyn Tracer, ray: Ray, depth: u32, recursion: bool) -> Self {
        Self {
            world,
            tracer,
            ray,
            depth,
            recursion,
        }
    }

    /// Whether materials may spawn secondary rays.
    pub fn can_recurse(&self) -> bool {
        self.recursion
    }

    /// Unit direction back toward the ray origin.
    pub fn wo(&self) -> Vec3 {
        -self.ray.direction.normalize_or_zero()
    }

    /// Trace a secondary ray one level deeper.
    pub fn trace(&self, ray: &Ray) -> Color {
        self.tracer.trace_ray(self.world, ray, self.depth + 1)
    }
}

/// Trait for shading drivers.
pub trait Tracer: Send + Sync {
    /// Radiance arriving along `ray` at recursion level `depth`.
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32) -> Color;
}

/// Recursive reflection and refraction, stopped after `max_depth` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Whitted {
    pub max_depth: u32,
}

impl Whitted {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }
}

impl Tracer for Whitted {
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32) -> Color {
        if depth > self.max_depth {
            return world.background;
        }

        match world.hit_objects(ray) {
            Some(hit) => {
                let ctx = ShadeContext::new(world, self, *ray, depth, true);
                hit.material.shade(&ctx, &hit)
            }
            None => world.background,
        }
    }
}

/// Direct lighting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RayCast;

impl Tracer for RayCast {
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32) -> Color {
        match world.hit_objects(ray) {
            Some(hit) => {
                let ctx = ShadeContext::new(world, self, *ray, depth, false);
                hit.material.shade(&ctx, &hit)
            }
            None => world.background,
        }
    }
}

/// Unlit material colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlatTracer;

impl Tracer for FlatTracer {
    fn trace_ray(&self, world: &World, ray: &Ray, _depth: u32) -> Color {
        world
            .hit_bare(ray)
            .and_then(|hit| world.object(hit.object))
            .map_or(world.background, |object| object.material().flat_color())
    }
}

/// Build the tracer selected in the render settings.
pub fn tracer_for(kind: TracerKind, max_depth: u32) -> Box<dyn Tracer> {
    match kind {
        TracerKind::Whitted => Box::new(Whitted::new(max_depth)),
        TracerKind::RayCast => Box::new(RayCast),
        TracerKind::Flat => Box::new(FlatTracer),
    }
}
