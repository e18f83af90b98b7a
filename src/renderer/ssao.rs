//! Screen space ambient occlusion: a hemisphere sample kernel, a tiled
//! rotation noise texture and two single channel targets, the raw estimate
//! and its blurred copy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::*;
use crate::math::prelude::*;
use crate::video::prelude::*;

/// Number of samples of the hemisphere kernel, `samples[0..64]`.
pub const KERNEL_SIZE: usize = 64;
/// The noise texture is tiled over the screen in blocks of this many pixels.
pub const NOISE_SIZE: u32 = 4;

const SEED: [u8; 32] = [
    0x65, 0x64, 0x75, 0x52, 0x65, 0x6e, 0x20, 0x73, 0x73, 0x61, 0x6f, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

#[derive(Debug, Clone, Copy)]
struct Targets {
    raw: RenderTextureHandle,
    raw_surface: SurfaceHandle,
    blur: RenderTextureHandle,
    blur_surface: SurfaceHandle,
}

pub struct Ssao {
    kernel: Vec<Vector3<f32>>,
    noise: Vec<Vector3<f32>>,
    noise_texture: Option<TextureHandle>,
    targets: Option<Targets>,
}

impl Default for Ssao {
    fn default() -> Self {
        Ssao::new()
    }
}

impl Ssao {
    /// Generates the kernel and noise from a fixed seed, so every run
    /// samples the same way.
    pub fn new() -> Self {
        let mut rng = StdRng::from_seed(SEED);

        let kernel = (0..KERNEL_SIZE)
            .map(|i| {
                let sample = Vector3::new(
                    rng.gen_range(-1.0f32, 1.0),
                    rng.gen_range(-1.0f32, 1.0),
                    rng.gen_range(0.0f32, 1.0),
                )
                .normalize()
                    * rng.gen_range(0.0f32, 1.0);

                // Cluster samples near the origin.
                let scale = i as f32 / KERNEL_SIZE as f32;
                sample * lerp(0.1, 1.0, scale * scale)
            })
            .collect();

        let noise = (0..NOISE_SIZE * NOISE_SIZE)
            .map(|_| Vector3::new(rng.gen_range(-1.0f32, 1.0), rng.gen_range(-1.0f32, 1.0), 0.0))
            .collect();

        Ssao {
            kernel,
            noise,
            noise_texture: None,
            targets: None,
        }
    }

    #[inline]
    pub fn kernel(&self) -> &[Vector3<f32>] {
        &self.kernel
    }

    /// Creates the noise texture and the occlusion targets if they are
    /// missing or sized for another window. Returns true if the targets were
    /// (re)allocated.
    pub fn ensure(&mut self, video: &mut dyn Visitor, dimensions: Vector2<u32>) -> Result<bool> {
        if self.noise_texture.is_none() {
            let params = TextureParams {
                format: TextureFormat::RGB32F,
                wrap: TextureWrap::Repeat,
                filter: TextureFilter::Nearest,
                mipmap: false,
                dimensions: Vector2::new(NOISE_SIZE, NOISE_SIZE),
                ..Default::default()
            };

            let bytes = self
                .noise
                .iter()
                .flat_map(|v| vec![v.x, v.y, v.z])
                .flat_map(|v| v.to_bits().to_ne_bytes().to_vec())
                .collect();

            let data = TextureData {
                layers: vec![bytes],
            };

            self.noise_texture = Some(video.create_texture(params, data)?);
        }

        if let Some(v) = self.targets {
            let current = video.render_texture_params(v.raw).map(|v| v.dimensions);
            if current == Some(dimensions) {
                return Ok(false);
            }
        }

        self.release_targets(video)?;

        let params = RenderTextureParams {
            format: RenderTextureFormat::R16F,
            dimensions,
            ..Default::default()
        };

        let raw = video.create_render_texture(params)?;
        let mut surface = SurfaceParams::default();
        surface.set_attachments(&[raw], None)?;
        let raw_surface = video.create_surface(surface)?;

        let blur = video.create_render_texture(params)?;
        surface.set_attachments(&[blur], None)?;
        let blur_surface = video.create_surface(surface)?;

        self.targets = Some(Targets {
            raw,
            raw_surface,
            blur,
            blur_surface,
        });

        Ok(true)
    }

    /// Runs the estimate and blur sub-passes on the G-buffer. Returns the
    /// number of triangles drawn.
    pub fn draw(
        &self,
        video: &mut dyn Visitor,
        estimate: ShaderHandle,
        blur: ShaderHandle,
        quad: MeshHandle,
        gbuffer: &super::gbuffer::GBuffer,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
    ) -> Result<u32> {
        let (targets, noise) = match (self.targets, self.noise_texture) {
            (Some(targets), Some(noise)) => (targets, noise),
            _ => bail!("SSAO targets are not allocated."),
        };

        let (position, normal) = match (gbuffer.position(), gbuffer.normal()) {
            (Some(position), Some(normal)) => (position, normal),
            _ => bail!("SSAO needs an allocated G-buffer."),
        };

        let dimensions = video
            .render_texture_params(targets.raw)
            .map(|v| v.dimensions)
            .ok_or_else(|| VideoError::HandleInvalid(targets.raw.to_string()))?;

        let mut triangles = 0;

        {
            let mut pass = PassScope::begin(video, "ssao-estimate");
            pass.target(Some(targets.raw_surface), dimensions)?;
            pass.clear(Some(Vector4::new(1.0, 1.0, 1.0, 1.0)), None)?;
            pass.bind_shader(estimate)?;
            pass.bind_uniform("gPosition", position.into())?;
            pass.bind_uniform("gNormal", normal.into())?;
            pass.bind_uniform("texNoise", noise.into())?;
            pass.bind_uniform("view", view.into())?;
            pass.bind_uniform("projection", projection.into())?;

            let scale = Vector2::new(
                dimensions.x as f32 / NOISE_SIZE as f32,
                dimensions.y as f32 / NOISE_SIZE as f32,
            );
            pass.bind_uniform("noiseScale", scale.into())?;

            for (i, v) in self.kernel.iter().enumerate() {
                pass.bind_uniform(&format!("samples[{}]", i), (*v).into())?;
            }

            triangles += pass.draw(quad)?;
        }

        {
            let mut pass = PassScope::begin(video, "ssao-blur");
            pass.target(Some(targets.blur_surface), dimensions)?;
            pass.bind_shader(blur)?;
            pass.bind_uniform("ssaoInput", targets.raw.into())?;
            triangles += pass.draw(quad)?;
        }

        Ok(triangles)
    }

    /// The blurred occlusion, sampled by the lighting pass.
    #[inline]
    pub fn occlusion(&self) -> Option<RenderTextureHandle> {
        self.targets.map(|v| v.blur)
    }

    #[inline]
    pub fn raw(&self) -> Option<RenderTextureHandle> {
        self.targets.map(|v| v.raw)
    }

    fn release_targets(&mut self, video: &mut dyn Visitor) -> Result<()> {
        if let Some(v) = self.targets.take() {
            video.delete_surface(v.raw_surface)?;
            video.delete_surface(v.blur_surface)?;
            video.delete_render_texture(v.raw)?;
            video.delete_render_texture(v.blur)?;
        }

        Ok(())
    }

    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        self.release_targets(video)?;
        if let Some(v) = self.noise_texture.take() {
            video.delete_texture(v)?;
        }

        Ok(())
    }
}

#[inline]
fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + f * (b - a)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kernel_lies_in_hemisphere() {
        let ssao = Ssao::new();
        assert_eq!(ssao.kernel().len(), KERNEL_SIZE);
        for v in ssao.kernel() {
            assert!(v.z >= 0.0);
            assert!(v.magnitude() <= 1.0 + 1e-5);
        }

        // Deterministic.
        assert_eq!(Ssao::new().kernel(), ssao.kernel());
    }

    #[test]
    fn ensure_is_lazy() {
        let mut video = RecordingVisitor::new(Vector2::new(64, 64));
        let mut ssao = Ssao::new();

        assert!(ssao.ensure(&mut video, Vector2::new(64, 64)).unwrap());
        assert_eq!(video.alive_textures(), 1);
        assert_eq!(video.alive_render_textures(), 2);
        video.take_calls();

        assert!(!ssao.ensure(&mut video, Vector2::new(64, 64)).unwrap());
        assert_eq!(video.count(|v| v.is_allocation()), 0);

        assert!(ssao.ensure(&mut video, Vector2::new(32, 32)).unwrap());
        assert_eq!(video.alive_textures(), 1);
        assert_eq!(video.alive_render_textures(), 2);

        ssao.release(&mut video).unwrap();
        assert_eq!(video.alive_textures(), 0);
        assert_eq!(video.alive_surfaces(), 0);
    }
}
