// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod bounding_box;
mod interval;
mod ray;

pub use bounding_box::BoundingBox;
pub use interval::Interval;
pub use ray::Ray;

/// RGB color with linear components, typically in 0-1.
pub type Color = Vec3;
