//! XML scene description support.
//!
//! A scene file is a `<scene>` root holding materials, lights, objects, a
//! camera, a background color and render settings. Materials, lights and
//! objects may optionally be wrapped in `<materials>`, `<lights>` and
//! `<objects>` groups.
//!
//! # Example
//!
//! ```ignore
//! use ember_core::scene_file::load_scene;
//!
//! let scene = load_scene("scenes/spheres.xml")?;
//! println!("Loaded {} objects", scene.object_count());
//! ```

mod loader;
mod parser;

pub use loader::*;
pub use parser::*;
