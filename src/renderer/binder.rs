//! Material and light uniforms.
//!
//! Programs pick their shading path from four integer uniforms,
//! `variant.baseColor`, `variant.normal`, `variant.shadow` and
//! `variant.reflection`, so a single program covers every material without
//! relinking. Lights are written into the `pointLights[i]` and `dirLights[j]`
//! arrays followed by `pointLightsCount` and `dirLightsCount`.

use crate::errors::*;
use crate::math::prelude::*;
use crate::scene::{Light, LightKind, Material, Scene, TextureSlot};
use crate::video::prelude::*;

use super::config::RenderConfig;
use super::resources::SceneResources;
use super::shadow::{ShadowKind, ShadowMaps};

/// Where the diffuse and specular colors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseColorSource {
    PlainColor = 0,
    Textured = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    Vertex = 0,
    /// Tangent space normal map.
    NormalMap = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowSource {
    Unshadowed = 0,
    Shadowed = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionSource {
    Nothing = 0,
    /// Reflects the skybox, weighted by the reflection map.
    Skybox = 1,
}

/// The shading path selected for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variants {
    pub base_color: BaseColorSource,
    pub normal: NormalSource,
    pub shadow: ShadowSource,
    pub reflection: ReflectionSource,
}

impl Variants {
    pub fn bind(&self, video: &mut dyn Visitor) -> Result<()> {
        video.bind_uniform("variant.baseColor", UniformVariable::I32(self.base_color as i32))?;
        video.bind_uniform("variant.normal", UniformVariable::I32(self.normal as i32))?;
        video.bind_uniform("variant.shadow", UniformVariable::I32(self.shadow as i32))?;
        video.bind_uniform("variant.reflection", UniformVariable::I32(self.reflection as i32))
    }
}

/// Binds the material of a mesh and selects its shading path. Textures are
/// loaded on first use, textures that fail to load leave their slot unbound.
pub fn bind_material(
    video: &mut dyn Visitor,
    resources: &mut SceneResources,
    material: &Material,
    attributes: MeshAttributes,
    config: &RenderConfig,
) -> Result<Variants> {
    let mut variants = Variants {
        base_color: BaseColorSource::PlainColor,
        normal: NormalSource::Vertex,
        shadow: if config.shadows {
            ShadowSource::Shadowed
        } else {
            ShadowSource::Unshadowed
        },
        reflection: ReflectionSource::Nothing,
    };

    if material.is_textured() {
        variants.base_color = BaseColorSource::Textured;

        for &slot in TextureSlot::ALL.iter() {
            let texture = match material.texture(slot) {
                Some(path) => resources.texture(video, path)?,
                None => None,
            };

            let texture = match texture {
                Some(v) => v,
                None => continue,
            };

            match slot {
                TextureSlot::Normal => {
                    if !(config.normal_mapping && attributes.tangents && attributes.bitangents) {
                        continue;
                    }

                    variants.normal = NormalSource::NormalMap;
                }
                TextureSlot::Reflection => {
                    let skybox = match resources.skybox() {
                        Some(v) if config.skybox => v,
                        _ => continue,
                    };

                    video.bind_uniform("skybox", skybox.into())?;
                    variants.reflection = ReflectionSource::Skybox;
                }
                _ => {}
            }

            video.bind_uniform(slot.uniform(), texture.into())?;
        }
    } else {
        video.bind_uniform("material.ambientColor", material.ambient.into())?;
        video.bind_uniform("material.diffuseColor", material.diffuse.into())?;
        video.bind_uniform("material.specularColor", material.specular.into())?;
    }

    video.bind_uniform("material.shininess", material.shininess.into())?;
    variants.bind(video)?;
    Ok(variants)
}

/// Number of lights written by `bind_lights`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightCounts {
    pub points: usize,
    pub directionals: usize,
}

/// Binds every light of `scene`, or only the light named `filter`. Shadow
/// maps are bound when shadows are enabled and the light has one.
pub fn bind_lights(
    video: &mut dyn Visitor,
    scene: &Scene,
    shadows: &ShadowMaps,
    config: &RenderConfig,
    filter: Option<&str>,
) -> Result<LightCounts> {
    let mut counts = LightCounts::default();

    for light in scene.lights() {
        if filter.map(|v| v != light.name).unwrap_or(false) {
            continue;
        }

        match light.kind {
            LightKind::Point => {
                let prefix = format!("pointLights[{}]", counts.points);
                let bind = |video: &mut dyn Visitor, field: &str, v: UniformVariable| {
                    video.bind_uniform(&format!("{}.{}", prefix, field), v)
                };

                bind(video, "pos", scene.light_position(light).to_vec().into())?;
                bind_colors(video, &prefix, light, config)?;
                bind(video, "constant", light.attenuation.constant.into())?;
                bind(video, "linear", light.attenuation.linear.into())?;
                bind(video, "quadratic", light.attenuation.quadratic.into())?;

                let entry = shadows.get(&light.name).filter(|_| config.shadows);
                if let Some(entry) = entry {
                    if let ShadowKind::Point {
                        matrices,
                        far_plane,
                        ..
                    } = entry.kind
                    {
                        bind(video, "shadowMap", entry.texture.into())?;
                        bind(video, "farPlane", far_plane.into())?;
                        for (i, v) in matrices.iter().enumerate() {
                            bind(video, &format!("shadowMatrices[{}]", i), (*v).into())?;
                        }
                    }
                }

                counts.points += 1;
            }
            LightKind::Directional => {
                let prefix = format!("dirLights[{}]", counts.directionals);
                let bind = |video: &mut dyn Visitor, field: &str, v: UniformVariable| {
                    video.bind_uniform(&format!("{}.{}", prefix, field), v)
                };

                bind(video, "dir", scene.light_direction(light).into())?;
                bind_colors(video, &prefix, light, config)?;

                let entry = shadows.get(&light.name).filter(|_| config.shadows);
                if let Some(entry) = entry {
                    if let ShadowKind::Directional { light_space, .. } = entry.kind {
                        bind(video, "shadowMap", entry.texture.into())?;
                        bind(video, "lightSpace", light_space.into())?;
                    }
                }

                counts.directionals += 1;
            }
        }
    }

    video.bind_uniform("pointLightsCount", UniformVariable::I32(counts.points as i32))?;
    video.bind_uniform("dirLightsCount", UniformVariable::I32(counts.directionals as i32))?;
    Ok(counts)
}

fn bind_colors(
    video: &mut dyn Visitor,
    prefix: &str,
    light: &Light,
    config: &RenderConfig,
) -> Result<()> {
    let mask = |enabled: bool, v: Vector3<f32>| if enabled { v } else { Vector3::zero() };

    let ambient = mask(config.ambient, light.ambient);
    let diffuse = mask(config.diffuse, light.diffuse);
    let specular = mask(config.specular, light.specular);

    video.bind_uniform(&format!("{}.ambient", prefix), ambient.into())?;
    video.bind_uniform(&format!("{}.diffuse", prefix), diffuse.into())?;
    video.bind_uniform(&format!("{}.specular", prefix), specular.into())
}
