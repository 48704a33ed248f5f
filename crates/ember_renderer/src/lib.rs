//! Ember Renderer - Whitted-style CPU ray tracing.
//!
//! Rays are traced against a flat list of objects (analytic spheres,
//! triangles and ray-marched implicit surfaces), shaded with direct lighting
//! and shadows, and recursed for mirror reflection and refraction.
//!
//! A render goes through three stages:
//!
//! - [`RenderSetup::build`] turns an `ember_core::SceneDescription` into a
//!   [`World`], a [`Camera`], a [`Sampler`] template and a [`Tracer`]
//! - [`render`] traces every scanline in parallel
//! - [`ImageBuffer::save_png`] writes the result

pub mod brdf;
mod camera;
mod hit;
pub mod implicit;
pub mod light;
pub mod material;
mod renderer;
pub mod sampler;
mod setup;
mod sphere;
pub mod tracer;
mod triangle;
mod world;

pub use camera::Camera;
pub use hit::{GeometricObject, Hit};
pub use implicit::{ImplicitSurface, MarchParams, ScalarField};
pub use light::{Ambient, Directional, Light, PointLight};
pub use material::{Emissive, Material, Matte, Phong, Reflective, Transparent};
pub use renderer::{
    color_to_rgba, max_to_one, render, render_pixel, ImageBuffer, RenderError, RenderResult,
};
pub use sampler::{Sampler, SamplerError};
pub use setup::{build_material, build_world, BuildError, BuildResult, RenderSetup};
pub use sphere::Sphere;
pub use tracer::{tracer_for, FlatTracer, RayCast, ShadeContext, Tracer, Whitted};
pub use triangle::Triangle;
pub use world::{BareHit, World, HIT_EPSILON, SHADOW_EPSILON};

/// Re-export common math types from ember_math
pub use ember_math::{Color, Interval, Ray, Vec2, Vec3};
