//! Immutable textures sampled by shaders and the render textures used as
//! framebuffer attachments.

use crate::errors::*;
use crate::math::prelude::Vector2;

impl_handle!(TextureHandle);
impl_handle!(RenderTextureHandle);

/// Whether a texture holds one image or the six faces of a cube.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureKind {
    Texture2D,
    Cube,
}

impl TextureKind {
    /// Returns the number of images a texture of this kind holds.
    pub fn layers(self) -> usize {
        match self {
            TextureKind::Texture2D => 1,
            TextureKind::Cube => 6,
        }
    }
}

/// Specify how the texture is used whenever the pixel being sampled.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureFilter {
    /// Returns the value of the texture element that is nearest (in Manhattan distance)
    /// to the center of the pixel being textured.
    Nearest,
    /// Returns the weighted average of the four texture elements that are closest to the
    /// center of the pixel being textured.
    Linear,
}

/// Sets the wrap parameter for texture.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureWrap {
    /// Samples at coord x + 1 map to coord x.
    Repeat,
    /// Samples at coord x + 1 map to coord 1.
    Clamp,
    /// Samples outside [0, 1] return the border color, which is white. Used by
    /// shadow maps so nothing outside the light frustum is shadowed.
    Border,
}

/// The parameters of a texture object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureParams {
    pub kind: TextureKind,
    pub format: TextureFormat,
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    /// Should we generates a complete set of mipmaps for a texture object.
    pub mipmap: bool,
    pub dimensions: Vector2<u32>,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            kind: TextureKind::Texture2D,
            format: TextureFormat::RGBA8,
            wrap: TextureWrap::Repeat,
            filter: TextureFilter::Linear,
            mipmap: true,
            dimensions: Vector2::new(0, 0),
        }
    }
}

/// Pixel data of every layer of a texture, in the order +X, -X, +Y, -Y, +Z,
/// -Z for cube maps.
#[derive(Debug, Clone, Default)]
pub struct TextureData {
    pub layers: Vec<Vec<u8>>,
}

impl TextureParams {
    /// Checks that `data` has one correctly sized image per layer.
    pub fn validate(&self, data: &TextureData) -> Result<()> {
        if data.layers.len() != self.kind.layers() {
            bail!(
                "{:?} texture needs {} layers, got {}.",
                self.kind,
                self.kind.layers(),
                data.layers.len()
            );
        }

        let len = self.format.size() * self.dimensions.x as usize * self.dimensions.y as usize;
        for (i, v) in data.layers.iter().enumerate() {
            if v.len() != len {
                bail!("Layer {} has {} bytes, expected {}.", i, v.len(), len);
            }
        }

        Ok(())
    }
}

/// List of all the possible formats of input data when uploading to texture.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
    RGB32F,
}

impl TextureFormat {
    /// Returns the size in bytes of a pixel of this type.
    pub fn size(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RG8 => 2,
            TextureFormat::RGB8 => 3,
            TextureFormat::RGBA8 => 4,
            TextureFormat::RGB32F => 12,
        }
    }
}

/// List of all the possible formats of renderable texture which could be use as
/// attachment of framebuffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RenderTextureFormat {
    R8,
    RGB8,
    RGBA8,
    R16F,
    RGB16F,
    RGBA16F,
    Depth24,
    Depth32F,
    Depth24Stencil8,
}

impl RenderTextureFormat {
    pub fn is_color(self) -> bool {
        match self {
            RenderTextureFormat::Depth24
            | RenderTextureFormat::Depth32F
            | RenderTextureFormat::Depth24Stencil8 => false,
            _ => true,
        }
    }
}

/// A `RenderTexture` object is basicly texture object with special format. It can
/// be used as a render target. If the `sampler` field is true, it can also be the
/// source of a texture access from a shader, otherwise it is a plain render buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderTextureParams {
    pub kind: TextureKind,
    pub format: RenderTextureFormat,
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    pub dimensions: Vector2<u32>,
    pub sampler: bool,
    /// Number of samples per pixel, 1 disables multisampling.
    pub samples: u8,
}

impl Default for RenderTextureParams {
    fn default() -> Self {
        RenderTextureParams {
            kind: TextureKind::Texture2D,
            format: RenderTextureFormat::RGBA8,
            wrap: TextureWrap::Clamp,
            filter: TextureFilter::Nearest,
            dimensions: Vector2::new(0, 0),
            sampler: true,
            samples: 1,
        }
    }
}

impl RenderTextureParams {
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.x == 0 || self.dimensions.y == 0 {
            bail!("Render texture can not have zero size {:?}.", self.dimensions);
        }

        if self.kind == TextureKind::Cube && self.dimensions.x != self.dimensions.y {
            bail!("Cube render texture must be square, got {:?}.", self.dimensions);
        }

        if self.samples == 0 {
            bail!("Render texture needs at least one sample.");
        }

        if self.samples > 1 && self.kind == TextureKind::Cube {
            bail!("Cube render texture can not be multisampled.");
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validate_texture_data() {
        let params = TextureParams {
            kind: TextureKind::Cube,
            format: TextureFormat::RGB8,
            dimensions: Vector2::new(2, 2),
            ..Default::default()
        };

        let mut data = TextureData {
            layers: vec![vec![0; 12]; 6],
        };
        assert!(params.validate(&data).is_ok());

        data.layers.pop();
        assert!(params.validate(&data).is_err());

        data.layers.push(vec![0; 11]);
        assert!(params.validate(&data).is_err());
    }

    #[test]
    fn validate_render_texture() {
        let mut params = RenderTextureParams {
            kind: TextureKind::Cube,
            format: RenderTextureFormat::Depth24,
            dimensions: Vector2::new(512, 512),
            ..Default::default()
        };
        assert!(params.validate().is_ok());

        params.dimensions.y = 256;
        assert!(params.validate().is_err());

        params.kind = TextureKind::Texture2D;
        params.samples = 4;
        assert!(params.validate().is_ok());
        assert!(!params.format.is_color());
    }
}
