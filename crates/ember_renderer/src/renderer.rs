//! Render driver.
//!
//! Scanlines are rendered in parallel with rayon. Each scanline forks its own
//! sampler from the template with a seed derived from the render seed and the
//! row, so the image is the same for a given seed no matter how rows are
//! scheduled.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;

use crate::{camera::Camera, sampler::Sampler, tracer::Tracer, world::World};
use ember_core::RenderSettings;
use ember_math::Color;

/// Errors that can occur while rendering or writing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render cancelled")]
    Cancelled,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pixel buffer does not match a {width}x{height} image")]
    BufferSize { width: u32, height: u32 },
}

pub type RenderResult<T> = Result<T, RenderError>;

const GAMMA: f32 = 2.2;

/// Scale an out-of-gamut color down so its largest channel is one.
pub fn max_to_one(color: Color) -> Color {
    let max = color.max_element();
    if max > 1.0 {
        color / max
    } else {
        color
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let mapped = max_to_one(color.max(Color::ZERO)).powf(1.0 / GAMMA);
    let to_byte = |c: f32| (255.0 * c.clamp(0.0, 1.0) + 0.5) as u8;
    [to_byte(mapped.x), to_byte(mapped.y), to_byte(mapped.z), 255]
}

/// Linear radiance per pixel, row-major from the top left.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to RGBA bytes (for saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let texels: Vec<[u8; 4]> = self.pixels.iter().map(|&c| color_to_rgba(c)).collect();
        bytemuck::cast_slice(&texels).to_vec()
    }

    /// Write the image as a PNG (or any format `image` infers from the path).
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let (width, height) = (self.width, self.height);
        let img = image::RgbaImage::from_raw(width, height, self.to_rgba())
            .ok_or(RenderError::BufferSize { width, height })?;
        img.save(path.as_ref())?;
        log::info!("Wrote {}", path.as_ref().display());
        Ok(())
    }
}

/// Average `samples` camera rays through pixel `(x, y)`.
pub fn render_pixel(
    camera: &Camera,
    world: &World,
    tracer: &dyn Tracer,
    sampler: &mut Sampler,
    x: u32,
    y: u32,
    exposure: f32,
) -> Color {
    let samples = sampler.num_samples();
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let offset = sampler.sample_unit_square();
        let ray = camera.ray_for(x, y, offset);
        pixel_color += tracer.trace_ray(world, &ray, 0);
    }

    pixel_color / samples as f32 * exposure
}

/// Seed of the sampler serving row `y`.
fn row_seed(seed: u64, y: u32) -> u64 {
    seed ^ (y as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render the whole image.
///
/// `cancel` is checked before each scanline; once set, the render stops and
/// returns [`RenderError::Cancelled`].
pub fn render(
    camera: &Camera,
    world: &World,
    tracer: &dyn Tracer,
    sampler: &Sampler,
    settings: &RenderSettings,
    cancel: &AtomicBool,
) -> RenderResult<ImageBuffer> {
    let (width, height) = (camera.image_width, camera.image_height);
    let start = Instant::now();
    log::info!(
        "Rendering {}x{} with {} {:?} samples per pixel",
        width,
        height,
        sampler.num_samples(),
        sampler.kind()
    );

    let rows = (0..height)
        .into_par_iter()
        .map(|y| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let mut row_sampler = sampler.fork(row_seed(settings.seed, y));
            let row: Vec<Color> = (0..width)
                .map(|x| {
                    render_pixel(camera, world, tracer, &mut row_sampler, x, y, settings.exposure)
                })
                .collect();
            Some(row)
        })
        .collect::<Option<Vec<Vec<Color>>>>();

    let Some(rows) = rows else {
        log::warn!("Render cancelled after {:.2?}", start.elapsed());
        return Err(RenderError::Cancelled);
    };

    let image = ImageBuffer {
        width,
        height,
        pixels: rows.into_iter().flatten().collect(),
    };
    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{material::Emissive, sphere::Sphere, tracer::Whitted};
    use ember_core::SamplerKind;
    use ember_math::Vec3;
    use std::sync::Arc;

    fn scene() -> (Camera, World) {
        let mut camera = Camera::new()
            .with_resolution(8, 6)
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_fov(30.0);
        camera.initialize();

        let mut world = World::new();
        world.background = Color::new(0.0, 0.0, 0.25);
        world.add_object(Box::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Emissive::new(1.0, Color::new(1.0, 0.5, 0.0))),
        )));
        (camera, world)
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::ONE), [255, 255, 255, 255]);
        // Out of gamut keeps the hue
        assert_eq!(color_to_rgba(Color::new(4.0, 0.0, 0.0)), [255, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::new(-1.0, 0.0, 0.0)), [0, 0, 0, 255]);
    }

    #[test]
    fn test_max_to_one() {
        let c = max_to_one(Color::new(2.0, 1.0, 0.5));
        assert_eq!(c, Color::new(1.0, 0.5, 0.25));
        assert_eq!(max_to_one(Color::splat(0.5)), Color::splat(0.5));
    }

    #[test]
    fn test_image_buffer_rgba_layout() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(1, 0, Color::ONE);

        assert_eq!(image.get(1, 0), Color::ONE);
        assert_eq!(image.to_rgba(), vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_render_center_and_corner() {
        let (camera, world) = scene();
        let sampler = Sampler::new(SamplerKind::Jittered, 4, 4, 0).unwrap();
        let settings = RenderSettings::default();

        let image = render(&camera, &world, &Whitted::new(5), &sampler, &settings, &AtomicBool::new(false))
            .unwrap();

        assert_eq!(image.pixels.len(), 48);
        assert!((image.get(4, 3) - Color::new(1.0, 0.5, 0.0)).length() < 1e-5);
        assert_eq!(image.get(0, 0), world.background);
    }

    #[test]
    fn test_render_is_deterministic() {
        let (camera, world) = scene();
        let sampler = Sampler::new(SamplerKind::MultiJittered, 4, 8, 3).unwrap();
        let settings = RenderSettings::default();
        let cancel = AtomicBool::new(false);

        let a = render(&camera, &world, &Whitted::new(5), &sampler, &settings, &cancel).unwrap();
        let b = render(&camera, &world, &Whitted::new(5), &sampler, &settings, &cancel).unwrap();
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn test_cancelled_render() {
        let (camera, world) = scene();
        let sampler = Sampler::new(SamplerKind::Regular, 1, 1, 0).unwrap();
        let settings = RenderSettings::default();

        let result = render(&camera, &world, &Whitted::new(5), &sampler, &settings, &AtomicBool::new(true));
        assert!(matches!(result, Err(RenderError::Cancelled)));
    }
}
