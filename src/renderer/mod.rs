//! Frame orchestration.
//!
//! A frame runs the following passes, in order:
//!
//! 1. `Shadow`, one per light, if shadows are enabled. Otherwise every shadow
//!    map allocated by earlier frames is released.
//! 2. `Forward`, or `Geometry`, `Ssao` and `Lighting` in deferred mode.
//! 3. `Normals`, if enabled.
//! 4. `LightMarkers`, always.
//! 5. `Skybox` if enabled and loaded, else `ShadowDebug` if a light is selected.
//! 6. `Resolve` and `ToneMap`, if the scene is rendered offscreen, which is
//!    always the case in deferred mode.
//! 7. `Overlays`, if any is enabled.
//!
//! Every pass runs in a `PassScope`, so the bound surface, the viewport, the
//! cull face, the depth test and the polygon mode are restored after each of
//! them.

pub mod binder;
pub mod config;
pub mod gbuffer;
pub mod post;
pub mod resources;
pub mod shaders;
pub mod shadow;
pub mod ssao;

pub use self::config::RenderConfig;
pub use self::resources::SceneResources;
pub use self::shaders::{Program, ShaderRegistry};

use smallvec::SmallVec;

use crate::errors::*;
use crate::math::prelude::*;
use crate::scene::{Camera, Scene};
use crate::video::prelude::*;

use self::gbuffer::GBuffer;
use self::post::PostProcess;
use self::shadow::ShadowMaps;
use self::ssao::Ssao;

const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];
/// Edge length of the cubes drawn at light positions.
const MARKER_SCALE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Shadow,
    Forward,
    Geometry,
    Ssao,
    Lighting,
    Normals,
    LightMarkers,
    Skybox,
    ShadowDebug,
    Resolve,
    ToneMap,
    Overlays,
}

impl Pass {
    /// The debug marker of the pass.
    pub fn label(self) -> &'static str {
        match self {
            Pass::Shadow => "shadow",
            Pass::Forward => "forward",
            Pass::Geometry => "geometry",
            Pass::Ssao => "ssao",
            Pass::Lighting => "lighting",
            Pass::Normals => "normals",
            Pass::LightMarkers => "light-markers",
            Pass::Skybox => "skybox",
            Pass::ShadowDebug => "shadow-debug",
            Pass::Resolve => "resolve",
            Pass::ToneMap => "tonemap",
            Pass::Overlays => "overlays",
        }
    }
}

/// What a frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Executed passes, in order. Consecutive shadow passes are merged.
    pub passes: SmallVec<[Pass; 16]>,
    pub draws: u32,
    pub triangles: u32,
}

impl FrameStats {
    #[inline]
    fn draw(&mut self, triangles: u32) {
        self.draws += 1;
        self.triangles += triangles;
    }
}

/// Per frame inputs shared by the passes.
struct Frame<'a> {
    scene: &'a Scene,
    config: &'a RenderConfig,
    camera: &'a Camera,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    target: Option<SurfaceHandle>,
    dimensions: Vector2<u32>,
}

/// Owns every render target that outlives a frame.
pub struct Renderer {
    shaders: ShaderRegistry,
    shadows: ShadowMaps,
    gbuffer: GBuffer,
    ssao: Ssao,
    post: PostProcess,
}

impl Renderer {
    pub fn new(shaders: ShaderRegistry) -> Self {
        Renderer {
            shaders,
            shadows: ShadowMaps::new(),
            gbuffer: GBuffer::new(),
            ssao: Ssao::new(),
            post: PostProcess::new(),
        }
    }

    #[inline]
    pub fn shaders(&self) -> &ShaderRegistry {
        &self.shaders
    }

    #[inline]
    pub fn shadows(&self) -> &ShadowMaps {
        &self.shadows
    }

    #[inline]
    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    #[inline]
    pub fn ssao(&self) -> &Ssao {
        &self.ssao
    }

    #[inline]
    pub fn post(&self) -> &PostProcess {
        &self.post
    }

    /// Renders `scene` as seen by `camera` into the default framebuffer.
    pub fn render(
        &mut self,
        video: &mut dyn Visitor,
        scene: &Scene,
        resources: &mut SceneResources,
        camera: &Camera,
        config: &RenderConfig,
    ) -> Result<FrameStats> {
        let mut stats = FrameStats::default();
        let dimensions = camera.dimensions();

        video.set_cull_face(CullFace::Back)?;
        video.set_depth_test(true, Comparison::Less)?;
        video.set_polygon_mode(PolygonMode::Fill)?;

        if config.shadows {
            let (draws, triangles) = self.shadows.update(
                video,
                &self.shaders,
                resources,
                scene,
                config.shadow_resolution,
            )?;

            if !scene.lights().is_empty() {
                stats.passes.push(Pass::Shadow);
                stats.draws += draws;
                stats.triangles += triangles;
            }
        } else {
            self.shadows.release(video)?;
        }

        let target = if config.offscreen() {
            self.post.ensure(video, dimensions, config)?;
            self.post.surface()
        } else {
            self.post.release(video)?;
            None
        };

        let frame = Frame {
            scene,
            config,
            camera,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            target,
            dimensions,
        };

        if config.deferred {
            if self.gbuffer.ensure(video, dimensions)? {
                info!("G-buffer resized to {}x{}.", dimensions.x, dimensions.y);
            }

            self.geometry(video, resources, &frame, &mut stats)?;

            if config.ssao {
                self.ssao.ensure(video, dimensions)?;
                let mut pass = PassScope::begin(video, Pass::Ssao.label());
                let triangles = self.ssao.draw(
                    &mut *pass,
                    self.shaders.get(Program::Ssao),
                    self.shaders.get(Program::SsaoBlur),
                    resources.quad(),
                    &self.gbuffer,
                    frame.view,
                    frame.projection,
                )?;

                stats.passes.push(Pass::Ssao);
                stats.draws += 2;
                stats.triangles += triangles;
            } else {
                self.ssao.release(video)?;
            }

            self.lighting(video, resources, &frame, &mut stats)?;
        } else {
            self.gbuffer.release(video)?;
            self.ssao.release(video)?;
            self.forward(video, resources, &frame, &mut stats)?;
        }

        if config.draw_normals {
            self.normals(video, resources, &frame, &mut stats)?;
        }

        self.light_markers(video, resources, &frame, &mut stats)?;

        if let (true, Some(skybox)) = (config.skybox, resources.skybox()) {
            self.skybox(video, resources, skybox, &frame, &mut stats)?;
        } else if let Some(ref light) = config.shadow_debug {
            let triangles = self.shadows.draw_debug(
                video,
                &self.shaders,
                resources,
                light,
                target,
                dimensions,
            )?;

            if let Some(triangles) = triangles {
                stats.passes.push(Pass::ShadowDebug);
                stats.draw(triangles);
            }
        }

        if config.offscreen() {
            if self.post.is_multisampled() {
                self.post.resolve(video)?;
                stats.passes.push(Pass::Resolve);
            }

            let shader = self.shaders.get(Program::ToneMap);
            let triangles = self.post.tone_map(video, shader, resources.quad(), config)?;
            stats.passes.push(Pass::ToneMap);
            stats.draw(triangles);
        }

        self.overlays(video, resources, &frame, &mut stats)?;

        trace!(
            "Frame {:?}, {} draws, {} triangles.",
            stats.passes,
            stats.draws,
            stats.triangles
        );

        Ok(stats)
    }

    /// Deletes every render target and program.
    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        self.shadows.release(video)?;
        self.gbuffer.release(video)?;
        self.ssao.release(video)?;
        self.post.release(video)?;
        self.shaders.release(video)
    }

    fn forward(
        &self,
        video: &mut dyn Visitor,
        resources: &mut SceneResources,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let mut pass = PassScope::begin(video, Pass::Forward.label());
        pass.target(frame.target, frame.dimensions)?;
        pass.clear(Some(CLEAR_COLOR.into()), Some(1.0))?;
        pass.bind_shader(self.shaders.get(Program::Main))?;
        bind_camera(&mut *pass, frame)?;
        binder::bind_lights(&mut *pass, frame.scene, &self.shadows, frame.config, None)?;

        if frame.config.wireframe {
            pass.set_polygon_mode(PolygonMode::Line)?;
        }

        for draw in frame.scene.draws() {
            let record = *resources.mesh(draw.mesh);
            let material = frame.scene.material(draw.mesh);
            let attributes = record.params.attributes;
            binder::bind_material(&mut *pass, resources, material, attributes, frame.config)?;
            pass.bind_uniform("model", draw.world.into())?;
            stats.draw(pass.draw(record.handle)?);
        }

        stats.passes.push(Pass::Forward);
        Ok(())
    }

    fn geometry(
        &self,
        video: &mut dyn Visitor,
        resources: &mut SceneResources,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let mut pass = PassScope::begin(video, Pass::Geometry.label());
        pass.target(self.gbuffer.surface(), frame.dimensions)?;
        pass.clear(Some(Vector4::zero()), Some(1.0))?;
        pass.bind_shader(self.shaders.get(Program::GeometryPass))?;
        pass.bind_uniform("view", frame.view.into())?;
        pass.bind_uniform("projection", frame.projection.into())?;

        if frame.config.wireframe {
            pass.set_polygon_mode(PolygonMode::Line)?;
        }

        for draw in frame.scene.draws() {
            let record = *resources.mesh(draw.mesh);
            let material = frame.scene.material(draw.mesh);
            let attributes = record.params.attributes;
            binder::bind_material(&mut *pass, resources, material, attributes, frame.config)?;
            pass.bind_uniform("model", draw.world.into())?;
            stats.draw(pass.draw(record.handle)?);
        }

        stats.passes.push(Pass::Geometry);
        Ok(())
    }

    fn lighting(
        &self,
        video: &mut dyn Visitor,
        resources: &SceneResources,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let (surface, [position, normal, albedo_spec]) =
            match (self.gbuffer.surface(), self.gbuffer.colors()) {
                (Some(surface), Some(colors)) => (surface, colors),
                _ => bail!("Lighting pass needs an allocated G-buffer."),
            };

        let mut pass = PassScope::begin(video, Pass::Lighting.label());
        pass.target(frame.target, frame.dimensions)?;
        pass.clear(Some(CLEAR_COLOR.into()), Some(1.0))?;
        // Later passes depth test against the scene geometry.
        pass.blit(Some(surface), frame.target, frame.dimensions, BlitMask::Depth)?;
        pass.set_depth_test(false, Comparison::Always)?;

        pass.bind_shader(self.shaders.get(Program::LightingPass))?;
        pass.bind_uniform("gPosition", position.into())?;
        pass.bind_uniform("gNormal", normal.into())?;
        pass.bind_uniform("gAlbedoSpec", albedo_spec.into())?;

        match self.ssao.occlusion().filter(|_| frame.config.ssao) {
            Some(occlusion) => {
                pass.bind_uniform("ssao", occlusion.into())?;
                pass.bind_uniform("variant.occlusion", UniformVariable::I32(1))?;
            }
            None => pass.bind_uniform("variant.occlusion", UniformVariable::I32(0))?,
        }

        let shadow = if frame.config.shadows {
            binder::ShadowSource::Shadowed
        } else {
            binder::ShadowSource::Unshadowed
        };

        pass.bind_uniform("variant.shadow", UniformVariable::I32(shadow as i32))?;
        pass.bind_uniform("camPos", frame.camera.position().to_vec().into())?;
        binder::bind_lights(&mut *pass, frame.scene, &self.shadows, frame.config, None)?;

        stats.draw(pass.draw(resources.quad())?);
        stats.passes.push(Pass::Lighting);
        Ok(())
    }

    fn normals(
        &self,
        video: &mut dyn Visitor,
        resources: &SceneResources,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let mut pass = PassScope::begin(video, Pass::Normals.label());
        pass.target(frame.target, frame.dimensions)?;
        pass.bind_shader(self.shaders.get(Program::NormalsDebug))?;
        pass.bind_uniform("view", frame.view.into())?;
        pass.bind_uniform("projection", frame.projection.into())?;

        for draw in frame.scene.draws() {
            let record = resources.mesh(draw.mesh);
            if !record.params.attributes.normals {
                continue;
            }

            pass.bind_uniform("model", draw.world.into())?;
            stats.draw(pass.draw(record.handle)?);
        }

        stats.passes.push(Pass::Normals);
        Ok(())
    }

    fn light_markers(
        &self,
        video: &mut dyn Visitor,
        resources: &SceneResources,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let mut pass = PassScope::begin(video, Pass::LightMarkers.label());
        pass.target(frame.target, frame.dimensions)?;
        pass.bind_shader(self.shaders.get(Program::LightMarker))?;

        let view_projection = frame.projection * frame.view;
        for light in frame.scene.lights() {
            let position = frame.scene.light_position(light);
            let model = Matrix4::from_translation(position.to_vec())
                * Matrix4::from_scale(MARKER_SCALE);

            pass.bind_uniform("MVP", (view_projection * model).into())?;
            pass.bind_uniform("lightColor", light.diffuse.into())?;
            stats.draw(pass.draw(resources.cube())?);
        }

        stats.passes.push(Pass::LightMarkers);
        Ok(())
    }

    fn skybox(
        &self,
        video: &mut dyn Visitor,
        resources: &SceneResources,
        skybox: TextureHandle,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<()> {
        // Rotation only, the skybox is infinitely far away.
        let v = frame.view;
        let view = Matrix4::from(Matrix3::from_cols(
            v.x.truncate(),
            v.y.truncate(),
            v.z.truncate(),
        ));

        let mut pass = PassScope::begin(video, Pass::Skybox.label());
        pass.target(frame.target, frame.dimensions)?;
        // The cube is seen from the inside.
        pass.set_cull_face(CullFace::Nothing)?;
        pass.set_depth_test(false, Comparison::LessOrEqual)?;
        pass.bind_shader(self.shaders.get(Program::Skybox))?;
        pass.bind_uniform("view", view.into())?;
        pass.bind_uniform("projection", frame.projection.into())?;
        pass.bind_uniform("skybox", skybox.into())?;
        stats.draw(pass.draw(resources.cube())?);

        stats.passes.push(Pass::Skybox);
        Ok(())
    }

    fn overlays(
        &self,
        video: &mut dyn Visitor,
        resources: &SceneResources,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let mut textures: SmallVec<[RenderTextureHandle; 4]> = SmallVec::new();
        if frame.config.gbuffer_overlay {
            if let Some(colors) = self.gbuffer.colors() {
                textures.extend(colors.iter().cloned());
            }

            if let Some(v) = self.ssao.occlusion() {
                textures.push(v);
            }
        }

        if !frame.config.gradient_overlay && textures.is_empty() {
            return Ok(());
        }

        let (w, h) = (frame.dimensions.x, frame.dimensions.y);
        let mut pass = PassScope::begin(video, Pass::Overlays.label());
        pass.target(None, frame.dimensions)?;
        pass.set_depth_test(false, Comparison::Always)?;

        if frame.config.gradient_overlay {
            pass.set_viewport(SurfaceViewport {
                position: Vector2::new(0, 0),
                size: Vector2::new(w, (h / 10).max(1)),
            })?;

            pass.bind_shader(self.shaders.get(Program::Gradient))?;
            stats.draw(pass.draw(resources.quad())?);
        }

        if !textures.is_empty() {
            let size = Vector2::new((w / 4).max(1), (h / 4).max(1));
            pass.bind_shader(self.shaders.get(Program::ScreenQuad))?;

            for (i, v) in textures.iter().enumerate() {
                pass.set_viewport(SurfaceViewport {
                    position: Vector2::new((i as u32 * size.x) as i32, (h - size.y) as i32),
                    size,
                })?;

                pass.bind_uniform("screen", (*v).into())?;
                stats.draw(pass.draw(resources.quad())?);
            }
        }

        stats.passes.push(Pass::Overlays);
        Ok(())
    }
}

fn bind_camera(video: &mut dyn Visitor, frame: &Frame) -> Result<()> {
    video.bind_uniform("view", frame.view.into())?;
    video.bind_uniform("projection", frame.projection.into())?;
    video.bind_uniform("camPos", frame.camera.position().to_vec().into())
}
