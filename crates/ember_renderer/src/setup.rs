//! Conversion from a loaded scene description to renderer objects.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    camera::Camera,
    hit::GeometricObject,
    implicit::{DecoCube, Heart, ImplicitSurface, ScalarField, SphereField, Tangle, TorusField},
    light::{Ambient, Directional, PointLight},
    material::{Emissive, Matte, Phong, Reflective, Transparent},
    sampler::{Sampler, SamplerError},
    sphere::Sphere,
    tracer::{tracer_for, Tracer},
    triangle::Triangle,
    world::World,
    Material,
};
use ember_core::{
    ImplicitKind, LightDescription, MarchOverrides, MaterialDescription, MaterialKind,
    ObjectDescription, RenderSettings, SceneDescription,
};
use ember_math::Vec3;

/// Errors that can occur while building a renderable scene.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("Object {object} references material {material}, but only {count} exist")]
    InvalidMaterial {
        object: usize,
        material: usize,
        count: usize,
    },

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Everything the render driver needs.
pub struct RenderSetup {
    pub world: World,
    pub camera: Camera,
    /// Template every scanline forks its sampler from
    pub sampler: Sampler,
    pub tracer: Box<dyn Tracer>,
    pub settings: RenderSettings,
}

impl RenderSetup {
    /// Build the world, camera, sampler and tracer for a scene.
    pub fn build(scene: &SceneDescription, settings: &RenderSettings) -> BuildResult<Self> {
        if settings.width == 0 || settings.height == 0 {
            return Err(BuildError::InvalidResolution {
                width: settings.width,
                height: settings.height,
            });
        }

        let world = build_world(scene)?;

        let mut camera = Camera::from_description(&scene.camera)
            .with_resolution(settings.width, settings.height);
        camera.initialize();

        let sampler = Sampler::new(
            settings.sampler,
            settings.samples,
            settings.sample_sets,
            settings.seed,
        )?;
        let tracer = tracer_for(settings.tracer, settings.max_depth);

        Ok(Self {
            world,
            camera,
            sampler,
            tracer,
            settings: settings.clone(),
        })
    }
}

/// Build one material.
pub fn build_material(desc: &MaterialDescription) -> Arc<dyn Material> {
    let phong = || Phong::new(desc.ka, desc.kd, desc.color, desc.ks, desc.exponent);
    match desc.kind {
        MaterialKind::Matte => Arc::new(Matte::new(desc.ka, desc.kd, desc.color)),
        MaterialKind::Phong => Arc::new(phong()),
        MaterialKind::Reflective => Arc::new(Reflective::new(phong(), desc.kr, desc.reflect_color)),
        MaterialKind::Transparent => Arc::new(Transparent::new(
            phong(),
            desc.kr,
            desc.reflect_color,
            desc.kt,
            desc.ior,
        )),
        MaterialKind::Emissive => Arc::new(Emissive::new(desc.emission, desc.color)),
    }
}

fn implicit<F: ScalarField + 'static>(
    field: F,
    center: Vec3,
    march: &MarchOverrides,
    material: Arc<dyn Material>,
) -> Box<dyn GeometricObject> {
    let params = field.march_params().apply(march);
    Box::new(ImplicitSurface::new(field, center, material).with_params(params))
}

/// Build the world: objects in file order, lights, ambient and background.
pub fn build_world(scene: &SceneDescription) -> BuildResult<World> {
    let materials: Vec<Arc<dyn Material>> = scene.materials.iter().map(build_material).collect();

    let mut world = World::new();
    world.background = scene.background;

    for (index, object) in scene.objects.iter().enumerate() {
        let material = materials
            .get(object.material())
            .cloned()
            .ok_or(BuildError::InvalidMaterial {
                object: index,
                material: object.material(),
                count: materials.len(),
            })?;

        match object {
            ObjectDescription::Sphere { center, radius, .. } => {
                world.add_object(Box::new(Sphere::new(*center, *radius, material)));
            }
            ObjectDescription::Triangle { vertices, .. } => {
                let [a, b, c] = *vertices;
                world.add_object(Box::new(Triangle::new(a, b, c, material)));
            }
            ObjectDescription::Mesh { mesh, .. } => {
                log::debug!("Expanding mesh with {} triangles", mesh.triangle_count());
                for triangle in Triangle::from_mesh(mesh, material) {
                    world.add_object(Box::new(triangle));
                }
            }
            ObjectDescription::Implicit {
                kind,
                center,
                march,
                ..
            } => {
                let surface = match *kind {
                    ImplicitKind::Sphere { radius } => {
                        implicit(SphereField::new(radius), *center, march, material)
                    }
                    ImplicitKind::Heart => implicit(Heart, *center, march, material),
                    ImplicitKind::Tangle => implicit(Tangle, *center, march, material),
                    ImplicitKind::DecoCube => implicit(DecoCube, *center, march, material),
                    ImplicitKind::Torus { major, minor } => {
                        implicit(TorusField::new(major, minor), *center, march, material)
                    }
                };
                world.add_object(surface);
            }
        }
    }

    let mut ambient_seen = false;
    for light in &scene.lights {
        match *light {
            LightDescription::Ambient { color, intensity } => {
                if ambient_seen {
                    log::warn!("Multiple ambient lights, keeping the last one");
                }
                ambient_seen = true;
                world.ambient = Ambient::new(color, intensity);
            }
            LightDescription::Directional {
                color,
                intensity,
                direction,
                shadows,
            } => world.add_light(Box::new(Directional::new(color, intensity, direction, shadows))),
            LightDescription::Point {
                color,
                intensity,
                location,
                shadows,
            } => world.add_light(Box::new(PointLight::new(color, intensity, location, shadows))),
        }
    }

    log::info!(
        "Built world '{}': {} objects, {} lights",
        scene.name,
        world.len(),
        world.lights().count()
    );

    Ok(world)
}
