//! Immutable GPU programs and the state switches that go along with them.

use crate::math::prelude::{Matrix4, Vector2, Vector3, Vector4};

use super::texture::{RenderTextureHandle, TextureHandle};

impl_handle!(ShaderHandle);

/// The sources of one program. The geometry stage is optional and is only
/// used by layered passes like cube shadow maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderParams {
    pub name: String,
    pub vs: String,
    pub fs: String,
    pub gs: Option<String>,
}

impl ShaderParams {
    pub fn new<T1, T2, T3>(name: T1, vs: T2, fs: T3) -> Self
    where
        T1: Into<String>,
        T2: Into<String>,
        T3: Into<String>,
    {
        ShaderParams {
            name: name.into(),
            vs: vs.into(),
            fs: fs.into(),
            gs: None,
        }
    }

    pub fn with_geometry<T: Into<String>>(mut self, gs: T) -> Self {
        self.gs = Some(gs.into());
        self
    }
}

/// Specify whether front- or back-facing polygons can be culled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CullFace {
    Nothing,
    Front,
    Back,
}

impl CullFace {
    /// Returns the opposite face. Depth-only passes render back faces so
    /// the stored depth sits behind the lit surface.
    pub fn inverted(self) -> CullFace {
        match self {
            CullFace::Front => CullFace::Back,
            CullFace::Back => CullFace::Front,
            CullFace::Nothing => CullFace::Front,
        }
    }
}

impl Default for CullFace {
    fn default() -> Self {
        CullFace::Back
    }
}

/// A pixel-wise comparison function.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Comparison {
    Never,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    Always,
}

/// How polygons are rasterized.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
}

/// Uniform variable for video program object. Matrices are supplied in
/// column major order, the way `cgmath` stores them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    Texture(TextureHandle),
    RenderTexture(RenderTextureHandle),
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix4f([[f32; 4]; 4]),
}

impl UniformVariable {
    /// Returns true if this variable occupies a texture unit.
    pub fn is_sampler(&self) -> bool {
        match *self {
            UniformVariable::Texture(_) | UniformVariable::RenderTexture(_) => true,
            _ => false,
        }
    }
}

impl From<TextureHandle> for UniformVariable {
    fn from(v: TextureHandle) -> Self {
        UniformVariable::Texture(v)
    }
}

impl From<RenderTextureHandle> for UniformVariable {
    fn from(v: RenderTextureHandle) -> Self {
        UniformVariable::RenderTexture(v)
    }
}

impl From<i32> for UniformVariable {
    fn from(v: i32) -> Self {
        UniformVariable::I32(v)
    }
}

impl From<f32> for UniformVariable {
    fn from(v: f32) -> Self {
        UniformVariable::F32(v)
    }
}

impl From<Vector2<f32>> for UniformVariable {
    fn from(v: Vector2<f32>) -> Self {
        UniformVariable::Vector2f(v.into())
    }
}

impl From<Vector3<f32>> for UniformVariable {
    fn from(v: Vector3<f32>) -> Self {
        UniformVariable::Vector3f(v.into())
    }
}

impl From<Vector4<f32>> for UniformVariable {
    fn from(v: Vector4<f32>) -> Self {
        UniformVariable::Vector4f(v.into())
    }
}

impl From<Matrix4<f32>> for UniformVariable {
    fn from(v: Matrix4<f32>) -> Self {
        UniformVariable::Matrix4f(v.into())
    }
}
