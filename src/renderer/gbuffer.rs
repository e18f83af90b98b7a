//! Render targets of the deferred geometry pass.

use crate::errors::*;
use crate::math::prelude::*;
use crate::video::prelude::*;

#[derive(Debug, Clone, Copy)]
struct Targets {
    position: RenderTextureHandle,
    normal: RenderTextureHandle,
    albedo_spec: RenderTextureHandle,
    depth: RenderTextureHandle,
    surface: SurfaceHandle,
}

/// World space positions, normals, albedo with specular intensity in alpha,
/// and a sampleable depth buffer, all sized to the window.
#[derive(Default)]
pub struct GBuffer {
    targets: Option<Targets>,
}

impl GBuffer {
    pub fn new() -> Self {
        GBuffer { targets: None }
    }

    /// Makes sure the targets exist with `dimensions`. They are recreated if
    /// they were never created or the window has been resized since. Returns
    /// true if anything was (re)allocated.
    pub fn ensure(&mut self, video: &mut dyn Visitor, dimensions: Vector2<u32>) -> Result<bool> {
        if let Some(v) = self.targets {
            let current = video.render_texture_params(v.position).map(|v| v.dimensions);
            if current == Some(dimensions) {
                return Ok(false);
            }
        }

        self.release(video)?;

        let color = |format| RenderTextureParams {
            format,
            dimensions,
            ..Default::default()
        };

        let position = video.create_render_texture(color(RenderTextureFormat::RGB16F))?;
        let normal = video.create_render_texture(color(RenderTextureFormat::RGB16F))?;
        let albedo_spec = video.create_render_texture(color(RenderTextureFormat::RGBA8))?;
        let depth = video.create_render_texture(color(RenderTextureFormat::Depth24Stencil8))?;

        let mut params = SurfaceParams::default();
        params.set_attachments(&[position, normal, albedo_spec], Some(depth))?;
        let surface = video.create_surface(params)?;

        debug!("Created G-buffer {}x{}.", dimensions.x, dimensions.y);

        self.targets = Some(Targets {
            position,
            normal,
            albedo_spec,
            depth,
            surface,
        });

        Ok(true)
    }

    /// Deletes the targets, if any.
    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        if let Some(v) = self.targets.take() {
            video.delete_surface(v.surface)?;
            video.delete_render_texture(v.position)?;
            video.delete_render_texture(v.normal)?;
            video.delete_render_texture(v.albedo_spec)?;
            video.delete_render_texture(v.depth)?;
        }

        Ok(())
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.targets.is_some()
    }

    #[inline]
    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.targets.map(|v| v.surface)
    }

    #[inline]
    pub fn position(&self) -> Option<RenderTextureHandle> {
        self.targets.map(|v| v.position)
    }

    #[inline]
    pub fn normal(&self) -> Option<RenderTextureHandle> {
        self.targets.map(|v| v.normal)
    }

    #[inline]
    pub fn albedo_spec(&self) -> Option<RenderTextureHandle> {
        self.targets.map(|v| v.albedo_spec)
    }

    #[inline]
    pub fn depth(&self) -> Option<RenderTextureHandle> {
        self.targets.map(|v| v.depth)
    }

    /// The three color attachments, in attachment order.
    pub fn colors(&self) -> Option<[RenderTextureHandle; 3]> {
        self.targets
            .map(|v| [v.position, v.normal, v.albedo_spec])
    }
}
