//! The scene as the renderer sees it: objects, lights and what lies behind.

use crate::{
    hit::{GeometricObject, Hit},
    light::{Ambient, Light},
};
use ember_math::{Color, Interval, Ray};

/// Smallest ray parameter a primary or secondary hit may have.
pub const HIT_EPSILON: f32 = 1e-3;
/// Smallest ray parameter a shadow blocker may have.
pub const SHADOW_EPSILON: f32 = 1e-3;

/// Nearest intersection without shading data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BareHit {
    pub t: f32,
    /// Index of the object in insertion order
    pub object: usize,
}

/// Renderable objects and the lights shining on them.
///
/// Read-only while rendering; shared by every render worker.
pub struct World {
    objects: Vec<Box<dyn GeometricObject>>,
    lights: Vec<Box<dyn Light>>,
    pub ambient: Ambient,
    pub background: Color,
}

impl World {
    /// Create an empty world with a black background.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            ambient: Ambient::default(),
            background: Color::ZERO,
        }
    }

    pub fn add_object(&mut self, object: Box<dyn GeometricObject>) {
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: Box<dyn Light>) {
        self.lights.push(light);
    }

    pub fn object(&self, index: usize) -> Option<&dyn GeometricObject> {
        self.objects.get(index).map(|o| o.as_ref())
    }

    pub fn lights(&self) -> impl Iterator<Item = &dyn Light> {
        self.lights.iter().map(|l| l.as_ref())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Nearest hit along the ray.
    ///
    /// Objects are tested in insertion order. A later object only wins with a
    /// strictly smaller `t`, so on ties the earlier object is reported.
    pub fn hit_objects(&self, ray: &Ray) -> Option<Hit<'_>> {
        let mut closest_so_far = f32::INFINITY;
        let mut nearest = None;

        for object in &self.objects {
            if let Some(hit) = object.hit(ray, Interval::new(HIT_EPSILON, closest_so_far)) {
                if hit.t < closest_so_far {
                    closest_so_far = hit.t;
                    nearest = Some(hit);
                }
            }
        }

        nearest
    }

    /// Nearest hit along the ray, reporting only `t` and the object index.
    pub fn hit_bare(&self, ray: &Ray) -> Option<BareHit> {
        let mut nearest: Option<BareHit> = None;

        for (index, object) in self.objects.iter().enumerate() {
            let closest = nearest.map_or(f32::INFINITY, |h| h.t);
            if let Some(t) = object.hit_t(ray, Interval::new(HIT_EPSILON, closest)) {
                if t < closest {
                    nearest = Some(BareHit { t, object: index });
                }
            }
        }

        nearest
    }

    /// Whether any object blocks the ray before `max_t`.
    pub fn occluded(&self, ray: &Ray, max_t: f32) -> bool {
        let ray_t = Interval::new(SHADOW_EPSILON, max_t);
        self.objects
            .iter()
            .any(|object| object.hit_t(ray, ray_t).is_some())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
