use gl;
use gl::types::*;

use crate::video::assets::prelude::*;

impl From<Comparison> for GLenum {
    fn from(cmp: Comparison) -> Self {
        match cmp {
            Comparison::Never => gl::NEVER,
            Comparison::Less => gl::LESS,
            Comparison::LessOrEqual => gl::LEQUAL,
            Comparison::Greater => gl::GREATER,
            Comparison::GreaterOrEqual => gl::GEQUAL,
            Comparison::Equal => gl::EQUAL,
            Comparison::NotEqual => gl::NOTEQUAL,
            Comparison::Always => gl::ALWAYS,
        }
    }
}

impl From<PolygonMode> for GLenum {
    fn from(mode: PolygonMode) -> Self {
        match mode {
            PolygonMode::Fill => gl::FILL,
            PolygonMode::Line => gl::LINE,
        }
    }
}

impl From<TextureWrap> for GLenum {
    fn from(wrap: TextureWrap) -> Self {
        match wrap {
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::Clamp => gl::CLAMP_TO_EDGE,
            TextureWrap::Border => gl::CLAMP_TO_BORDER,
        }
    }
}

impl From<BlitMask> for GLenum {
    fn from(mask: BlitMask) -> Self {
        match mask {
            BlitMask::Color => gl::COLOR_BUFFER_BIT,
            BlitMask::Depth => gl::DEPTH_BUFFER_BIT,
        }
    }
}

/// Returns `(internal_format, format, pixel_type)` of client texture data.
pub fn texture_format(format: TextureFormat) -> (GLenum, GLenum, GLenum) {
    match format {
        TextureFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
        TextureFormat::RG8 => (gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
        TextureFormat::RGB8 => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
        TextureFormat::RGBA8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
        TextureFormat::RGB32F => (gl::RGB32F, gl::RGB, gl::FLOAT),
    }
}

impl From<RenderTextureFormat> for (GLenum, GLenum, GLenum) {
    fn from(format: RenderTextureFormat) -> Self {
        match format {
            RenderTextureFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
            RenderTextureFormat::RGB8 => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
            RenderTextureFormat::RGBA8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
            RenderTextureFormat::R16F => (gl::R16F, gl::RED, gl::FLOAT),
            RenderTextureFormat::RGB16F => (gl::RGB16F, gl::RGB, gl::FLOAT),
            RenderTextureFormat::RGBA16F => (gl::RGBA16F, gl::RGBA, gl::FLOAT),
            RenderTextureFormat::Depth24 => (gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::FLOAT),
            RenderTextureFormat::Depth32F => {
                (gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT)
            }
            RenderTextureFormat::Depth24Stencil8 => {
                (gl::DEPTH24_STENCIL8, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8)
            }
        }
    }
}

/// The framebuffer attachment point of a depth format.
pub fn depth_attachment(format: RenderTextureFormat) -> GLenum {
    match format {
        RenderTextureFormat::Depth24Stencil8 => gl::DEPTH_STENCIL_ATTACHMENT,
        _ => gl::DEPTH_ATTACHMENT,
    }
}

/// The texture target a render texture is bound to.
pub fn render_texture_target(params: &RenderTextureParams) -> GLenum {
    match params.kind {
        TextureKind::Cube => gl::TEXTURE_CUBE_MAP,
        TextureKind::Texture2D if params.samples > 1 => gl::TEXTURE_2D_MULTISAMPLE,
        TextureKind::Texture2D => gl::TEXTURE_2D,
    }
}

/// The texture target a texture is bound to.
pub fn texture_target(kind: TextureKind) -> GLenum {
    match kind {
        TextureKind::Cube => gl::TEXTURE_CUBE_MAP,
        TextureKind::Texture2D => gl::TEXTURE_2D,
    }
}

/// The image target of one layer, faces of cube maps are `+X, -X, +Y, -Y, +Z, -Z`.
pub fn layer_target(kind: TextureKind, layer: usize) -> GLenum {
    match kind {
        TextureKind::Cube => gl::TEXTURE_CUBE_MAP_POSITIVE_X + layer as GLenum,
        TextureKind::Texture2D => gl::TEXTURE_2D,
    }
}
