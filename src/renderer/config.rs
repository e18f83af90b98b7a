use serde::{Deserialize, Serialize};

/// Feature toggles of the renderer. A frame is a function of the scene, the
/// camera, the loaded resources and one `RenderConfig`, which is never
/// mutated while the frame is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renders shadow maps for every light and samples them while shading.
    pub shadows: bool,
    /// Shades from a G-buffer instead of rendering every mesh lit.
    pub deferred: bool,
    /// Screen space ambient occlusion, deferred mode only.
    pub ssao: bool,
    /// Draws vertex normals as lines on top of the scene.
    pub draw_normals: bool,
    pub skybox: bool,
    /// Name of the light whose shadow map is drawn over the scene.
    pub shadow_debug: Option<String>,
    pub gradient_overlay: bool,
    /// Draws the G-buffer (and SSAO) textures as quads.
    pub gbuffer_overlay: bool,
    pub ambient: bool,
    pub diffuse: bool,
    pub specular: bool,
    pub normal_mapping: bool,
    pub wireframe: bool,
    /// Renders into a floating point target and tone maps it.
    pub hdr: bool,
    pub exposure: f32,
    /// Samples per pixel of the scene target, forward mode only.
    pub msaa_samples: u8,
    pub shadow_resolution: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            shadows: true,
            deferred: false,
            ssao: false,
            draw_normals: false,
            skybox: true,
            shadow_debug: None,
            gradient_overlay: false,
            gbuffer_overlay: false,
            ambient: true,
            diffuse: true,
            specular: true,
            normal_mapping: true,
            wireframe: false,
            hdr: false,
            exposure: 1.0,
            msaa_samples: 1,
            shadow_resolution: 1024,
        }
    }
}

impl RenderConfig {
    /// Multisampling is only used by the forward path, G-buffers are always
    /// single sampled.
    pub fn samples(&self) -> u8 {
        if self.deferred {
            1
        } else {
            self.msaa_samples.max(1)
        }
    }

    /// Returns true if the scene is rendered offscreen and then resolved into
    /// the default framebuffer. Deferred frames always are, the G-buffer depth
    /// is copied into a target whose format is known.
    pub fn offscreen(&self) -> bool {
        self.hdr || self.deferred || self.samples() > 1
    }
}
