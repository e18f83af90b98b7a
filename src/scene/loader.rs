//! Loads scenes from JSON files.
//!
//! ```json
//! {
//!     "root": 0,
//!     "nodes": [
//!         { "name": "root", "children": [1, 2] },
//!         { "name": "floor", "meshes": [0], "scale": [10, 1, 10] },
//!         { "name": "sun", "rotation": [-45, 0, 0] }
//!     ],
//!     "meshes": [
//!         { "name": "plane", "positions": [[0, 0, 0], [1, 0, 0], [0, 0, 1]],
//!           "faces": [[0, 2, 1]], "material": 0 }
//!     ],
//!     "materials": [ { "name": "wood", "diffuse_map": "textures/wood.png" } ],
//!     "lights": [ { "name": "sun", "kind": "directional" } ],
//!     "skybox": ["right.jpg", "left.jpg", "top.jpg", "bottom.jpg", "front.jpg", "back.jpg"]
//! }
//! ```
//!
//! Texture paths are relative to the scene file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::*;
use crate::math::prelude::*;

use super::graph::{Mesh, Node, Scene};
use super::light::{Attenuation, Light, LightKind};
use super::material::{Material, TextureSlot};

/// A loaded scene and the optional skybox faces, ordered `+X, -X, +Y, -Y, +Z, -Z`.
#[derive(Debug, Clone)]
pub struct SceneFile {
    pub scene: Scene,
    pub skybox: Option<[PathBuf; 6]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDesc {
    #[serde(default)]
    root: usize,
    nodes: Vec<NodeDesc>,
    #[serde(default)]
    meshes: Vec<MeshDesc>,
    #[serde(default)]
    materials: Vec<MaterialDesc>,
    #[serde(default)]
    lights: Vec<LightDesc>,
    #[serde(default)]
    skybox: Option<Vec<PathBuf>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeDesc {
    name: String,
    /// Column-major local matrix, replaces translation, rotation and scale.
    #[serde(default)]
    matrix: Option<[[f32; 4]; 4]>,
    #[serde(default)]
    translation: [f32; 3],
    /// Euler angles in degrees, applied in X, Y, Z order.
    #[serde(default)]
    rotation: [f32; 3],
    #[serde(default = "one")]
    scale: [f32; 3],
    #[serde(default)]
    meshes: Vec<usize>,
    #[serde(default)]
    children: Vec<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MeshDesc {
    #[serde(default)]
    name: String,
    positions: Vec<[f32; 3]>,
    #[serde(default)]
    normals: Vec<[f32; 3]>,
    #[serde(default)]
    texcoords: Vec<[f32; 2]>,
    #[serde(default)]
    tangents: Vec<[f32; 3]>,
    #[serde(default)]
    bitangents: Vec<[f32; 3]>,
    faces: Vec<Vec<u32>>,
    #[serde(default)]
    material: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaterialDesc {
    #[serde(default)]
    name: String,
    #[serde(default)]
    ambient: Option<[f32; 3]>,
    #[serde(default)]
    diffuse: Option<[f32; 3]>,
    #[serde(default)]
    specular: Option<[f32; 3]>,
    #[serde(default)]
    shininess: Option<f32>,
    #[serde(default)]
    diffuse_map: Option<PathBuf>,
    #[serde(default)]
    specular_map: Option<PathBuf>,
    #[serde(default)]
    normal_map: Option<PathBuf>,
    #[serde(default)]
    reflection_map: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LightDesc {
    name: String,
    kind: LightKind,
    #[serde(default)]
    ambient: Option<[f32; 3]>,
    #[serde(default)]
    diffuse: Option<[f32; 3]>,
    #[serde(default)]
    specular: Option<[f32; 3]>,
    #[serde(default)]
    attenuation: Attenuation,
    #[serde(default = "forward")]
    direction: [f32; 3],
}

fn one() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn forward() -> [f32; 3] {
    [0.0, 0.0, -1.0]
}

/// Reads and validates the scene at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SceneFile> {
    let path = path.as_ref();
    info!("Loading scene {:?}.", path);

    let json = fs::read_to_string(path)
        .map_err(|err| format_err!("Failed to read scene {:?}: {}", path, err))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    from_str(&json, dir)
}

/// Parses a scene description, resolving texture paths against `dir`.
pub fn from_str(json: &str, dir: &Path) -> Result<SceneFile> {
    let desc: SceneDesc = serde_json::from_str(json)?;

    let nodes = desc.nodes.into_iter().map(node).collect();
    let meshes = desc.meshes.into_iter().map(mesh).collect();
    let lights = desc.lights.into_iter().map(light).collect();
    let materials = desc
        .materials
        .into_iter()
        .map(|v| material(v, dir))
        .collect();

    let skybox = match desc.skybox {
        Some(faces) => {
            if faces.len() != 6 {
                bail!("Skybox needs 6 faces, got {}.", faces.len());
            }

            let mut iter = faces.into_iter().map(|v| dir.join(v));
            let mut next = || iter.next().unwrap_or_default();
            Some([next(), next(), next(), next(), next(), next()])
        }
        None => None,
    };

    let scene = Scene::new(nodes, desc.root, meshes, lights, materials)?;
    Ok(SceneFile { scene, skybox })
}

fn node(v: NodeDesc) -> Node {
    let transform = match v.matrix {
        Some(m) => Matrix4::from(m),
        None => {
            let [rx, ry, rz] = v.rotation;
            Matrix4::from_translation(v.translation.into())
                * Matrix4::from_angle_z(Deg(rz))
                * Matrix4::from_angle_y(Deg(ry))
                * Matrix4::from_angle_x(Deg(rx))
                * Matrix4::from_nonuniform_scale(v.scale[0], v.scale[1], v.scale[2])
        }
    };

    Node {
        name: v.name,
        transform,
        meshes: v.meshes,
        children: v.children,
    }
}

fn mesh(v: MeshDesc) -> Mesh {
    fn vec3(v: Vec<[f32; 3]>) -> Vec<Vector3<f32>> {
        v.into_iter().map(Vector3::from).collect()
    }

    Mesh {
        name: v.name,
        positions: vec3(v.positions),
        normals: vec3(v.normals),
        texcoords: v.texcoords.into_iter().map(Vector2::from).collect(),
        tangents: vec3(v.tangents),
        bitangents: vec3(v.bitangents),
        faces: v.faces,
        material: v.material,
    }
}

fn light(v: LightDesc) -> Light {
    let mut light = Light::new(v.name, v.kind);
    if let Some(c) = v.ambient {
        light.ambient = c.into();
    }

    if let Some(c) = v.diffuse {
        light.diffuse = c.into();
    }

    if let Some(c) = v.specular {
        light.specular = c.into();
    }

    light.attenuation = v.attenuation;
    light.direction = v.direction.into();
    light
}

fn material(v: MaterialDesc, dir: &Path) -> Material {
    let mut material = Material::new(v.name);
    if let Some(c) = v.ambient {
        material.ambient = c.into();
    }

    if let Some(c) = v.diffuse {
        material.diffuse = c.into();
    }

    if let Some(c) = v.specular {
        material.specular = c.into();
    }

    if let Some(s) = v.shininess {
        material.shininess = s;
    }

    let maps = [
        (TextureSlot::Diffuse, v.diffuse_map),
        (TextureSlot::Specular, v.specular_map),
        (TextureSlot::Normal, v.normal_map),
        (TextureSlot::Reflection, v.reflection_map),
    ];

    for (slot, path) in maps.iter() {
        material.set_texture(*slot, path.as_ref().map(|p| dir.join(p)));
    }

    material
}
