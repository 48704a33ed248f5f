//! Scene description types for Ember.
//!
//! A [`SceneDescription`] is what the scene loader produces: plain data with
//! no renderer types in it. The renderer turns it into intersectable objects,
//! lights and materials.

use ember_math::{Color, Vec3};

use crate::mesh::Mesh;
use crate::settings::RenderOverrides;

/// Index into [`SceneDescription::materials`].
pub type MaterialId = usize;

/// How a material responds to light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    /// Ambient + Lambertian diffuse
    Matte,
    /// Matte + glossy specular highlight
    Phong,
    /// Phong + perfect mirror reflection
    Reflective,
    /// Phong + reflection + refraction
    Transparent,
    /// Constant self-emitted color
    Emissive,
}

/// A named material definition.
///
/// Fields that a kind does not use are ignored by the renderer.
#[derive(Clone, Debug)]
pub struct MaterialDescription {
    pub name: String,
    pub kind: MaterialKind,
    /// Base (diffuse) color
    pub color: Color,
    /// Ambient reflection coefficient
    pub ka: f32,
    /// Diffuse reflection coefficient
    pub kd: f32,
    /// Specular coefficient
    pub ks: f32,
    /// Phong exponent
    pub exponent: f32,
    /// Mirror reflection coefficient
    pub kr: f32,
    /// Mirror reflection tint
    pub reflect_color: Color,
    /// Transmission coefficient
    pub kt: f32,
    /// Index of refraction
    pub ior: f32,
    /// Emitted radiance scale (emissive only)
    pub emission: f32,
}

impl MaterialDescription {
    /// A material of the given kind and color with default coefficients.
    pub fn new(name: impl Into<String>, kind: MaterialKind, color: Color) -> Self {
        Self {
            name: name.into(),
            kind,
            color,
            ..Default::default()
        }
    }
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: MaterialKind::Matte,
            color: Color::new(0.5, 0.5, 0.5),
            ka: 0.25,
            kd: 0.75,
            ks: 0.2,
            exponent: 20.0,
            kr: 0.75,
            reflect_color: Color::ONE,
            kt: 0.9,
            ior: 1.5,
            emission: 1.0,
        }
    }
}

/// A light source.
#[derive(Clone, Debug, PartialEq)]
pub enum LightDescription {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        /// Direction the light travels in
        direction: Vec3,
        shadows: bool,
    },
    Point {
        color: Color,
        intensity: f32,
        location: Vec3,
        shadows: bool,
    },
}

/// The scalar field an implicit surface is the zero set of.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImplicitKind {
    Sphere { radius: f32 },
    Heart,
    Tangle,
    DecoCube,
    Torus { major: f32, minor: f32 },
}

/// Per-surface ray marching parameters set in the scene file.
///
/// Unset fields keep the field's own defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MarchOverrides {
    pub distance_multiplier: Option<f32>,
    pub min_step: Option<f32>,
    pub max_step: Option<f32>,
    pub trigger_distance: Option<f32>,
    pub bisection_depth: Option<u32>,
}

/// A renderable object.
#[derive(Clone, Debug)]
pub enum ObjectDescription {
    Sphere {
        center: Vec3,
        radius: f32,
        material: MaterialId,
    },
    Triangle {
        vertices: [Vec3; 3],
        material: MaterialId,
    },
    Mesh {
        mesh: Mesh,
        material: MaterialId,
    },
    Implicit {
        kind: ImplicitKind,
        center: Vec3,
        march: MarchOverrides,
        material: MaterialId,
    },
}

impl ObjectDescription {
    /// The material this object references.
    pub fn material(&self) -> MaterialId {
        match self {
            Self::Sphere { material, .. }
            | Self::Triangle { material, .. }
            | Self::Mesh { material, .. }
            | Self::Implicit { material, .. } => *material,
        }
    }
}

/// Pinhole camera placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraDescription {
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60.0,
        }
    }
}

/// A complete scene, ready to be built by a renderer.
#[derive(Clone, Debug, Default)]
pub struct SceneDescription {
    /// Scene name (from the file stem)
    pub name: String,
    pub background: Color,
    pub camera: CameraDescription,
    /// Render settings the scene file asks for
    pub render: RenderOverrides,
    pub materials: Vec<MaterialDescription>,
    pub lights: Vec<LightDescription>,
    /// Objects in file order
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a material and return its id.
    pub fn add_material(&mut self, material: MaterialDescription) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Look up a material id by name.
    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials.iter().position(|m| m.name == name)
    }

    /// Number of objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
