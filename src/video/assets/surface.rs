//! A surface is a framebuffer object together with its attachments.

use crate::math::prelude::Vector2;
use crate::video::MAX_ATTACHMENTS;

use super::texture::RenderTextureHandle;

impl_handle!(SurfaceHandle);

/// The attachments of a surface. A surface without color attachments is a
/// depth-only target.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceParams {
    pub colors: [Option<RenderTextureHandle>; MAX_ATTACHMENTS],
    pub depth_stencil: Option<RenderTextureHandle>,
}

impl SurfaceParams {
    /// A surface with a single depth attachment.
    pub fn depth_only(depth: RenderTextureHandle) -> Self {
        SurfaceParams {
            colors: [None; MAX_ATTACHMENTS],
            depth_stencil: Some(depth),
        }
    }

    pub fn set_attachments(
        &mut self,
        colors: &[RenderTextureHandle],
        depth_stencil: Option<RenderTextureHandle>,
    ) -> crate::errors::Result<()> {
        if colors.len() > MAX_ATTACHMENTS {
            bail!(
                "Surface supports at most {} color attachments, got {}.",
                MAX_ATTACHMENTS,
                colors.len()
            );
        }

        self.colors = [None; MAX_ATTACHMENTS];
        for (i, &v) in colors.iter().enumerate() {
            self.colors[i] = Some(v);
        }

        self.depth_stencil = depth_stencil;
        Ok(())
    }

    /// Returns every attachment, colors first.
    pub fn attachments(&self) -> impl Iterator<Item = RenderTextureHandle> + '_ {
        self.colors
            .iter()
            .filter_map(|v| *v)
            .chain(self.depth_stencil.iter().cloned())
    }
}

/// The viewport rectangle of a surface, in pixels from the bottom-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceViewport {
    pub position: Vector2<i32>,
    pub size: Vector2<u32>,
}

impl SurfaceViewport {
    pub fn new(size: Vector2<u32>) -> Self {
        SurfaceViewport {
            position: Vector2::new(0, 0),
            size,
        }
    }
}

impl Default for SurfaceViewport {
    fn default() -> Self {
        SurfaceViewport::new(Vector2::new(0, 0))
    }
}

/// Which buffers are copied by a blit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlitMask {
    Color,
    Depth,
}
