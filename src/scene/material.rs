use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::math::prelude::Vector3;

/// The texture maps a material may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureSlot {
    Diffuse,
    Specular,
    Normal,
    Reflection,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Diffuse,
        TextureSlot::Specular,
        TextureSlot::Normal,
        TextureSlot::Reflection,
    ];

    /// The sampler uniform of this slot.
    pub fn uniform(self) -> &'static str {
        match self {
            TextureSlot::Diffuse => "material.diffuse",
            TextureSlot::Specular => "material.specular",
            TextureSlot::Normal => "material.normal",
            TextureSlot::Reflection => "material.reflection",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
    textures: [Option<PathBuf>; 4],
}

impl Default for Material {
    fn default() -> Self {
        Material {
            name: String::new(),
            ambient: Vector3::new(0.1, 0.1, 0.1),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(0.5, 0.5, 0.5),
            shininess: 32.0,
            textures: Default::default(),
        }
    }
}

impl Material {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Material {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn texture(&self, slot: TextureSlot) -> Option<&Path> {
        self.textures[slot as usize].as_ref().map(|v| v.as_path())
    }

    #[inline]
    pub fn set_texture<T: Into<PathBuf>>(&mut self, slot: TextureSlot, path: Option<T>) {
        self.textures[slot as usize] = path.map(|v| v.into());
    }

    /// Materials with a diffuse map are shaded from textures, the others from
    /// their flat colors.
    #[inline]
    pub fn is_textured(&self) -> bool {
        self.texture(TextureSlot::Diffuse).is_some()
    }
}
