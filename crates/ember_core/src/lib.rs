//! Ember Core - scene description and loading for the Ember renderer.
//!
//! This crate provides:
//!
//! - **Scene description types**: `SceneDescription`, `ObjectDescription`,
//!   `LightDescription`, `MaterialDescription`, `Mesh`
//! - **Loaders**: XML scene files and OFF polygon meshes
//! - **Render settings**: layered `RenderSettings` with JSON overrides
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{load_scene, RenderSettings};
//!
//! let scene = load_scene("scene.xml")?;
//! let settings = RenderSettings::default().with(&scene.render);
//! ```

pub mod mesh;
pub mod off;
pub mod scene;
pub mod scene_file;
pub mod settings;

// Re-export commonly used types
pub use mesh::Mesh;
pub use off::{load_off, parse_off, OffError};
pub use scene::{
    CameraDescription, ImplicitKind, LightDescription, MarchOverrides, MaterialDescription,
    MaterialId, MaterialKind, ObjectDescription, SceneDescription,
};
pub use scene_file::{load_scene, load_scene_from_string, SceneError};
pub use settings::{RenderOverrides, RenderSettings, SamplerKind, SettingsError, TracerKind};
