//! The offscreen scene target used for HDR and MSAA, and the passes that
//! bring it to the default framebuffer.

use crate::errors::*;
use crate::math::prelude::*;
use crate::video::prelude::*;

use super::config::RenderConfig;
use super::Pass;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    dimensions: Vector2<u32>,
    samples: u8,
    hdr: bool,
}

#[derive(Debug, Clone, Copy)]
struct Targets {
    layout: Layout,
    color: RenderTextureHandle,
    depth: RenderTextureHandle,
    surface: SurfaceHandle,
    // Single sampled copy of a multisampled `color`.
    resolve: Option<(RenderTextureHandle, SurfaceHandle)>,
}

#[derive(Default)]
pub struct PostProcess {
    targets: Option<Targets>,
}

impl PostProcess {
    pub fn new() -> Self {
        PostProcess { targets: None }
    }

    /// Allocates the scene target for `config`, recreating it when the
    /// window size, the sample count or the color format changed. Returns
    /// true if anything was (re)allocated.
    pub fn ensure(
        &mut self,
        video: &mut dyn Visitor,
        dimensions: Vector2<u32>,
        config: &RenderConfig,
    ) -> Result<bool> {
        let layout = Layout {
            dimensions,
            samples: config.samples(),
            hdr: config.hdr,
        };

        if self.targets.map(|v| v.layout) == Some(layout) {
            return Ok(false);
        }

        self.release(video)?;

        let format = if layout.hdr {
            RenderTextureFormat::RGBA16F
        } else {
            RenderTextureFormat::RGBA8
        };

        let color = video.create_render_texture(RenderTextureParams {
            format,
            dimensions,
            samples: layout.samples,
            filter: TextureFilter::Linear,
            ..Default::default()
        })?;

        let depth = video.create_render_texture(RenderTextureParams {
            format: RenderTextureFormat::Depth24Stencil8,
            dimensions,
            samples: layout.samples,
            sampler: false,
            ..Default::default()
        })?;

        let mut params = SurfaceParams::default();
        params.set_attachments(&[color], Some(depth))?;
        let surface = video.create_surface(params)?;

        let resolve = if layout.samples > 1 {
            let texture = video.create_render_texture(RenderTextureParams {
                format,
                dimensions,
                filter: TextureFilter::Linear,
                ..Default::default()
            })?;

            params.set_attachments(&[texture], None)?;
            Some((texture, video.create_surface(params)?))
        } else {
            None
        };

        debug!(
            "Created scene target {}x{}, {} samples, hdr: {}.",
            dimensions.x, dimensions.y, layout.samples, layout.hdr
        );

        self.targets = Some(Targets {
            layout,
            color,
            depth,
            surface,
            resolve,
        });

        Ok(true)
    }

    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        if let Some(v) = self.targets.take() {
            video.delete_surface(v.surface)?;
            video.delete_render_texture(v.color)?;
            video.delete_render_texture(v.depth)?;

            if let Some((texture, surface)) = v.resolve {
                video.delete_surface(surface)?;
                video.delete_render_texture(texture)?;
            }
        }

        Ok(())
    }

    /// The surface the scene is rendered into, `None` until `ensure` is called.
    #[inline]
    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.targets.map(|v| v.surface)
    }

    #[inline]
    pub fn is_multisampled(&self) -> bool {
        self.targets.map(|v| v.resolve.is_some()).unwrap_or(false)
    }

    /// Copies the multisampled scene into its single sampled twin.
    pub fn resolve(&self, video: &mut dyn Visitor) -> Result<()> {
        if let Some(Targets {
            layout,
            surface,
            resolve: Some((_, dst)),
            ..
        }) = self.targets
        {
            let mut pass = PassScope::begin(video, Pass::Resolve.label());
            pass.blit(Some(surface), Some(dst), layout.dimensions, BlitMask::Color)?;
        }

        Ok(())
    }

    /// Draws the scene into the default framebuffer, tone mapping HDR
    /// colors with `exposure`. Returns the number of triangles drawn.
    pub fn tone_map(
        &self,
        video: &mut dyn Visitor,
        shader: ShaderHandle,
        quad: MeshHandle,
        config: &RenderConfig,
    ) -> Result<u32> {
        let targets = match self.targets {
            Some(v) => v,
            None => bail!("Scene target is not allocated."),
        };

        let source = targets.resolve.map(|v| v.0).unwrap_or(targets.color);

        let mut pass = PassScope::begin(video, Pass::ToneMap.label());
        pass.target(None, targets.layout.dimensions)?;
        pass.set_depth_test(false, Comparison::Always)?;
        pass.bind_shader(shader)?;
        pass.bind_uniform("hdrBuffer", source.into())?;
        pass.bind_uniform("hdr", (targets.layout.hdr as i32).into())?;
        pass.bind_uniform("exposure", config.exposure.into())?;
        let triangles = pass.draw(quad)?;
        Ok(triangles)
    }
}
