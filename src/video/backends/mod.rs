//! The backend of renderer, which should be responsible for only one thing:
//! submitting draw-calls using low-level OpenGL video APIs.

pub mod record;
mod utils;

use super::assets::prelude::*;

use crate::errors::*;
use crate::math::prelude::{Vector2, Vector4};

/// Every GPU command issued by the renderer.
///
/// Implementations track the bound surface, viewport and cull face so that
/// `PassScope` can capture and restore them. Texture units are assigned to
/// sampler uniforms by name, and the assignment starts over whenever a shader
/// is bound.
pub trait Visitor {
    fn create_shader(&mut self, params: ShaderParams) -> Result<ShaderHandle>;
    fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    fn create_mesh(&mut self, data: &MeshData) -> Result<MeshHandle>;
    fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()>;

    fn create_texture(&mut self, params: TextureParams, data: TextureData)
        -> Result<TextureHandle>;
    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()>;

    fn create_render_texture(&mut self, params: RenderTextureParams)
        -> Result<RenderTextureHandle>;
    fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()>;
    /// Returns the parameters a render texture was created with, `None` if the
    /// handle is dead.
    fn render_texture_params(&self, handle: RenderTextureHandle) -> Option<RenderTextureParams>;

    /// Creates a framebuffer from existing render textures. Fails if the
    /// attachments are missing, of the wrong kind, or of different sizes.
    fn create_surface(&mut self, params: SurfaceParams) -> Result<SurfaceHandle>;
    fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()>;

    /// Binds a surface as the render target, `None` is the default framebuffer.
    fn bind_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()>;
    fn surface(&self) -> Option<SurfaceHandle>;

    fn set_viewport(&mut self, vp: SurfaceViewport) -> Result<()>;
    fn viewport(&self) -> SurfaceViewport;

    fn set_cull_face(&mut self, face: CullFace) -> Result<()>;
    fn cull_face(&self) -> CullFace;

    /// Enable or disable writing into the depth buffer and specify the value used
    /// for depth buffer comparisons.
    fn set_depth_test(&mut self, write: bool, comparison: Comparison) -> Result<()>;
    /// The depth write flag and comparison last set.
    fn depth_test(&self) -> (bool, Comparison);

    fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()>;
    fn polygon_mode(&self) -> PolygonMode;

    /// Clears the bound surface.
    fn clear(&mut self, color: Option<Vector4<f32>>, depth: Option<f32>) -> Result<()>;

    /// Copies a rectangle of `size` pixels from `src` into `dst`, resolving
    /// multisampled sources.
    fn blit(
        &mut self,
        src: Option<SurfaceHandle>,
        dst: Option<SurfaceHandle>,
        size: Vector2<u32>,
        mask: BlitMask,
    ) -> Result<()>;

    fn bind_shader(&mut self, shader: ShaderHandle) -> Result<()>;
    fn bind_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()>;

    /// Draws a mesh with the bound shader, returns the number of triangles.
    fn draw(&mut self, mesh: MeshHandle) -> Result<u32>;

    /// Opens a named group of commands, for debuggers and the recording backend.
    fn push_marker(&mut self, label: &str);
    fn pop_marker(&mut self);

    /// Blocks until all execution is complete.
    fn flush(&mut self) -> Result<()>;
}

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;
