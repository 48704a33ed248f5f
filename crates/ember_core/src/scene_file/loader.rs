//! Interpret a parsed scene document as a [`SceneDescription`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ember_math::{Color, Vec3};
use thiserror::Error;

use crate::off::{load_off, OffError};
use crate::scene::{
    CameraDescription, ImplicitKind, LightDescription, MarchOverrides, MaterialDescription,
    MaterialId, MaterialKind, ObjectDescription, SceneDescription,
};
use crate::scene_file::parser::{parse_xml, Element, ParseError};
use crate::settings::{RenderOverrides, SamplerKind, TracerKind};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to load mesh {path}: {source}")]
    Mesh {
        path: PathBuf,
        #[source]
        source: OffError,
    },

    #[error("Expected root element <scene>, found <{0}>")]
    NotAScene(String),

    #[error("Line {line}: <{element}> is missing {what}")]
    Missing {
        line: usize,
        element: String,
        what: String,
    },

    #[error("Line {line}: invalid {what} '{value}'")]
    InvalidValue {
        line: usize,
        what: String,
        value: String,
    },

    #[error("Line {line}: unknown material '{name}'")]
    UnknownMaterial { line: usize, name: String },
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

/// Grouping elements whose children are read as if they were top level.
const GROUPS: [&str; 3] = ["materials", "lights", "objects"];

/// Load a scene file from disk.
///
/// Mesh paths inside the scene are resolved relative to the scene file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> SceneResult<SceneDescription> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    load_scene_from_string(&content, base_dir, name)
}

/// Load a scene from XML text.
pub fn load_scene_from_string(
    content: &str,
    base_dir: &Path,
    name: &str,
) -> SceneResult<SceneDescription> {
    let root = parse_xml(content)?;
    if root.name != "scene" {
        return Err(SceneError::NotAScene(root.name));
    }

    let elements: Vec<&Element> = root
        .children
        .iter()
        .flat_map(|el| {
            if GROUPS.contains(&el.name.as_str()) {
                el.children.iter().collect::<Vec<_>>()
            } else {
                vec![el]
            }
        })
        .collect();

    let mut scene = SceneDescription::new(name);

    // Materials first so objects can reference ones defined later in the file
    for el in elements.iter().filter(|el| el.name == "material") {
        let material = parse_material(el)?;
        if scene.material_id(&material.name).is_some() {
            log::warn!(
                "Line {}: material '{}' defined twice, keeping the first",
                el.line,
                material.name
            );
        }
        scene.add_material(material);
    }

    for el in elements {
        match el.name.as_str() {
            "material" => {}
            "background" => scene.background = parse_background(el)?,
            "camera" => scene.camera = parse_camera(el)?,
            "render" => scene.render = parse_render(el)?,
            "light" => scene.lights.push(parse_light(el)?),
            "sphere" | "triangle" | "mesh" | "implicit" => {
                let object = parse_object(el, &scene, base_dir)?;
                scene.objects.push(object);
            }
            other => log::warn!("Line {}: ignoring unknown element <{}>", el.line, other),
        }
    }

    log::info!(
        "Loaded scene '{}': {} objects, {} lights, {} materials",
        scene.name,
        scene.object_count(),
        scene.lights.len(),
        scene.materials.len()
    );

    Ok(scene)
}

fn parse_background(el: &Element) -> SceneResult<Color> {
    match el.child("color") {
        Some(color) => parse_triple(color),
        None => parse_triple(el),
    }
}

fn parse_camera(el: &Element) -> SceneResult<CameraDescription> {
    let defaults = CameraDescription::default();
    Ok(CameraDescription {
        eye: child_triple(el, "eye")?.unwrap_or(defaults.eye),
        look_at: child_triple(el, "lookat")?.unwrap_or(defaults.look_at),
        up: child_triple(el, "up")?.unwrap_or(defaults.up),
        fov: child_scalar(el, "fov")?.unwrap_or(defaults.fov),
    })
}

fn parse_render(el: &Element) -> SceneResult<RenderOverrides> {
    let sampler = el.attr("sampler").map(|token| {
        SamplerKind::from_token(token).unwrap_or_else(|| {
            log::warn!(
                "Line {}: unknown sampler '{}', using regular sampling",
                el.line,
                token
            );
            SamplerKind::Regular
        })
    });
    let tracer = el.attr("tracer").map(|token| {
        TracerKind::from_token(token).unwrap_or_else(|| {
            log::warn!("Line {}: unknown tracer '{}', using whitted", el.line, token);
            TracerKind::Whitted
        })
    });

    Ok(RenderOverrides {
        width: attr_value(el, "width")?,
        height: attr_value(el, "height")?,
        samples: attr_value(el, "samples")?,
        sampler,
        sample_sets: attr_value(el, "sets")?,
        max_depth: attr_value(el, "max-depth")?,
        tracer,
        seed: attr_value(el, "seed")?,
        exposure: attr_value(el, "exposure")?,
    })
}

fn parse_material(el: &Element) -> SceneResult<MaterialDescription> {
    let name = el.attr("name").ok_or_else(|| missing(el, "attribute 'name'"))?;
    let kind = match el.attr("type").unwrap_or("matte") {
        "matte" => MaterialKind::Matte,
        "phong" => MaterialKind::Phong,
        "reflective" => MaterialKind::Reflective,
        "transparent" => MaterialKind::Transparent,
        "emissive" => MaterialKind::Emissive,
        other => return Err(invalid(el, "material type", other)),
    };

    let mut material = MaterialDescription::new(name, kind, Color::new(0.5, 0.5, 0.5));
    if let Some(color) = child_triple(el, "color")? {
        material.color = color;
    }
    if let Some(reflect_color) = child_triple(el, "reflect-color")? {
        material.reflect_color = reflect_color;
    }

    let scalars: [(&str, &mut f32); 8] = [
        ("ka", &mut material.ka),
        ("kd", &mut material.kd),
        ("ks", &mut material.ks),
        ("exp", &mut material.exponent),
        ("kr", &mut material.kr),
        ("kt", &mut material.kt),
        ("ior", &mut material.ior),
        ("emission", &mut material.emission),
    ];
    for (tag, slot) in scalars {
        if let Some(value) = child_scalar(el, tag)? {
            *slot = value;
        }
    }

    Ok(material)
}

fn parse_light(el: &Element) -> SceneResult<LightDescription> {
    let color = child_triple(el, "color")?.unwrap_or(Color::ONE);
    let intensity = child_scalar(el, "intensity")?.unwrap_or(1.0);
    let shadows = match el.attr("shadows") {
        None => false,
        Some(value) => parse_bool(value).ok_or_else(|| invalid(el, "shadow flag", value))?,
    };

    let kind = match el.attr("type") {
        Some(kind @ ("ambient" | "directional" | "point")) => kind,
        other => {
            log::warn!(
                "Line {}: unknown light type {:?}, using a point light",
                el.line,
                other
            );
            "point"
        }
    };

    Ok(match kind {
        "ambient" => LightDescription::Ambient { color, intensity },
        "directional" => LightDescription::Directional {
            color,
            intensity,
            direction: child_triple(el, "vector")?
                .ok_or_else(|| missing(el, "a <vector> direction"))?,
            shadows,
        },
        _ => LightDescription::Point {
            color,
            intensity,
            location: child_triple(el, "point")?
                .ok_or_else(|| missing(el, "a <point> location"))?,
            shadows,
        },
    })
}

fn parse_object(
    el: &Element,
    scene: &SceneDescription,
    base_dir: &Path,
) -> SceneResult<ObjectDescription> {
    let material = resolve_material(el, scene)?;

    match el.name.as_str() {
        "sphere" => Ok(ObjectDescription::Sphere {
            center: child_triple(el, "point")?.unwrap_or(Vec3::ZERO),
            radius: child_scalar(el, "radius")?.ok_or_else(|| missing(el, "a <radius>"))?,
            material,
        }),
        "triangle" => {
            let points = el
                .children_named("point")
                .map(parse_triple)
                .collect::<SceneResult<Vec<_>>>()?;
            let vertices: [Vec3; 3] = points
                .try_into()
                .map_err(|_| missing(el, "exactly three <point> vertices"))?;
            Ok(ObjectDescription::Triangle { vertices, material })
        }
        "mesh" => {
            let file = el.attr("file").ok_or_else(|| missing(el, "attribute 'file'"))?;
            let path = base_dir.join(file);
            let mesh = load_off(&path).map_err(|source| SceneError::Mesh { path, source })?;
            Ok(ObjectDescription::Mesh { mesh, material })
        }
        _ => Ok(ObjectDescription::Implicit {
            kind: parse_implicit_kind(el)?,
            center: child_triple(el, "point")?.unwrap_or(Vec3::ZERO),
            march: MarchOverrides {
                distance_multiplier: child_scalar(el, "multiplier")?,
                min_step: child_scalar(el, "min-step")?,
                max_step: child_scalar(el, "max-step")?,
                trigger_distance: child_scalar(el, "trigger")?,
                bisection_depth: child_scalar(el, "bisection")?,
            },
            material,
        }),
    }
}

fn parse_implicit_kind(el: &Element) -> SceneResult<ImplicitKind> {
    let kind = el.attr("kind").ok_or_else(|| missing(el, "attribute 'kind'"))?;
    Ok(match kind {
        "sphere" => ImplicitKind::Sphere {
            radius: child_scalar(el, "radius")?.unwrap_or(1.0),
        },
        "heart" => ImplicitKind::Heart,
        "tangle" => ImplicitKind::Tangle,
        "decocube" => ImplicitKind::DecoCube,
        "torus" => ImplicitKind::Torus {
            major: child_scalar(el, "major")?.unwrap_or(1.0),
            minor: child_scalar(el, "minor")?.unwrap_or(0.25),
        },
        other => return Err(invalid(el, "implicit kind", other)),
    })
}

fn resolve_material(el: &Element, scene: &SceneDescription) -> SceneResult<MaterialId> {
    let name = el
        .attr("material")
        .ok_or_else(|| missing(el, "attribute 'material'"))?;
    scene
        .material_id(name)
        .ok_or_else(|| SceneError::UnknownMaterial {
            line: el.line,
            name: name.to_string(),
        })
}

// =============================================================================
// Value helpers
// =============================================================================

/// Parse a comma-separated numeric triple such as `0.5, 1, -2`.
fn parse_triple(el: &Element) -> SceneResult<Vec3> {
    let text = el.text();
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid(el, &format!("<{}> triple", el.name), text))?;

    match values[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(invalid(el, &format!("<{}> triple", el.name), text)),
    }
}

fn parse_scalar<T: FromStr>(el: &Element) -> SceneResult<T> {
    el.text()
        .parse()
        .map_err(|_| invalid(el, &format!("<{}> value", el.name), el.text()))
}

fn child_triple(el: &Element, name: &str) -> SceneResult<Option<Vec3>> {
    el.child(name).map(parse_triple).transpose()
}

fn child_scalar<T: FromStr>(el: &Element, name: &str) -> SceneResult<Option<T>> {
    el.child(name).map(parse_scalar).transpose()
}

fn attr_value<T: FromStr>(el: &Element, name: &str) -> SceneResult<Option<T>> {
    el.attr(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| invalid(el, &format!("attribute '{}'", name), value))
        })
        .transpose()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn missing(el: &Element, what: &str) -> SceneError {
    SceneError::Missing {
        line: el.line,
        element: el.name.clone(),
        what: what.to_string(),
    }
}

fn invalid(el: &Element, what: &str, value: &str) -> SceneError {
    SceneError::InvalidValue {
        line: el.line,
        what: what.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(content: &str) -> SceneResult<SceneDescription> {
        let _ = env_logger::builder().is_test(true).try_init();
        load_scene_from_string(content, Path::new("."), "test")
    }

    const SCENE: &str = r#"<?xml version="1.0"?>
<scene>
  <background><color>0.1, 0.2, 0.3</color></background>
  <render width="64" height="48" samples="4" sampler="jittered" max-depth="3" tracer="raycast"/>
  <camera>
    <eye>0, 1, 10</eye>
    <lookat>0, 0, 0</lookat>
    <fov>45</fov>
  </camera>
  <objects>
    <sphere material="red">
      <point>0, 0, -1</point>
      <radius>0.5</radius>
    </sphere>
    <triangle material="mirror">
      <point>-1, -1, 0</point>
      <point>1, -1, 0</point>
      <point>0, 1, 0</point>
    </triangle>
    <implicit kind="torus" material="red">
      <point>2, 0, 0</point>
      <minor>0.5</minor>
      <bisection>6</bisection>
    </implicit>
  </objects>
  <lights>
    <light type="ambient"><intensity>0.2</intensity></light>
    <light type="directional" shadows="true">
      <color>1, 1, 0.9</color>
      <intensity>2</intensity>
      <vector>0, -1, 0</vector>
    </light>
  </lights>
  <materials>
    <material name="red" type="phong">
      <color>1, 0, 0</color>
      <ks>0.5</ks>
      <exp>40</exp>
    </material>
    <material name="mirror" type="reflective"><kr>0.9</kr></material>
  </materials>
</scene>"#;

    #[test]
    fn test_load_full_scene() {
        let scene = load(SCENE).unwrap();

        assert_eq!(scene.name, "test");
        assert_eq!(scene.background, Color::new(0.1, 0.2, 0.3));
        assert_eq!(scene.camera.eye, Vec3::new(0.0, 1.0, 10.0));
        assert_eq!(scene.camera.fov, 45.0);
        assert_eq!(scene.camera.up, Vec3::Y);

        assert_eq!(scene.render.width, Some(64));
        assert_eq!(scene.render.sampler, Some(SamplerKind::Jittered));
        assert_eq!(scene.render.max_depth, Some(3));
        assert_eq!(scene.render.tracer, Some(TracerKind::RayCast));
        assert_eq!(scene.render.seed, None);

        assert_eq!(scene.materials.len(), 2);
        assert_eq!(scene.materials[0].kind, MaterialKind::Phong);
        assert_eq!(scene.materials[0].exponent, 40.0);
        assert_eq!(scene.materials[1].kr, 0.9);

        assert_eq!(scene.object_count(), 3);
        assert!(matches!(
            scene.objects[0],
            ObjectDescription::Sphere { radius, material: 0, .. } if radius == 0.5
        ));
        assert_eq!(scene.objects[1].material(), 1);
        match &scene.objects[2] {
            ObjectDescription::Implicit {
                kind, center, march, ..
            } => {
                assert_eq!(*kind, ImplicitKind::Torus { major: 1.0, minor: 0.5 });
                assert_eq!(*center, Vec3::new(2.0, 0.0, 0.0));
                assert_eq!(march.bisection_depth, Some(6));
                assert_eq!(march.max_step, None);
            }
            other => panic!("expected implicit, got {:?}", other),
        }

        assert_eq!(scene.lights.len(), 2);
        assert_eq!(
            scene.lights[1],
            LightDescription::Directional {
                color: Color::new(1.0, 1.0, 0.9),
                intensity: 2.0,
                direction: Vec3::new(0.0, -1.0, 0.0),
                shadows: true,
            }
        );
    }

    #[test]
    fn test_unknown_light_type_defaults_to_point() {
        let scene = load(
            r#"<scene>
                 <light type="spot"><point>0, 5, 0</point></light>
               </scene>"#,
        )
        .unwrap();

        assert_eq!(
            scene.lights[0],
            LightDescription::Point {
                color: Color::ONE,
                intensity: 1.0,
                location: Vec3::new(0.0, 5.0, 0.0),
                shadows: false,
            }
        );
    }

    #[test]
    fn test_unknown_sampler_defaults_to_regular() {
        let scene = load(r#"<scene><render sampler="halton" samples="9"/></scene>"#).unwrap();

        assert_eq!(scene.render.sampler, Some(SamplerKind::Regular));
        assert_eq!(scene.render.samples, Some(9));
    }

    #[test]
    fn test_unknown_material_reference() {
        let result = load(
            r#"<scene>
                 <sphere material="gold"><radius>1</radius></sphere>
               </scene>"#,
        );

        assert!(matches!(
            result,
            Err(SceneError::UnknownMaterial { ref name, .. }) if name == "gold"
        ));
    }

    #[test]
    fn test_bad_triple() {
        let result = load(r#"<scene><background><color>1, 2</color></background></scene>"#);

        assert!(matches!(result, Err(SceneError::InvalidValue { .. })));
    }

    #[test]
    fn test_triangle_needs_three_points() {
        let result = load(
            r#"<scene>
                 <material name="m"/>
                 <triangle material="m"><point>0,0,0</point><point>1,0,0</point></triangle>
               </scene>"#,
        );

        assert!(matches!(result, Err(SceneError::Missing { .. })));
    }

    #[test]
    fn test_missing_mesh_file() {
        let result = load(
            r#"<scene>
                 <material name="m"/>
                 <mesh material="m" file="does/not/exist.off"/>
               </scene>"#,
        );

        assert!(matches!(
            result,
            Err(SceneError::Mesh {
                source: OffError::Io(_),
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_root() {
        assert!(matches!(load("<world/>"), Err(SceneError::NotAScene(_))));
    }
}
