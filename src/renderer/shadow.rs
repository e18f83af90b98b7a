//! Shadow maps, one depth target per light.
//!
//! Directional lights render the scene through an orthographic camera into
//! a 2D depth texture. Point lights render all six faces of a depth cube
//! map in a single layered pass, with one view-projection per face.

use crate::errors::*;
use crate::math::prelude::*;
use crate::scene::{Light, LightKind, Scene};
use crate::utils::hash::FastHashMap;
use crate::video::prelude::*;

use super::resources::SceneResources;
use super::shaders::{Program, ShaderRegistry};
use super::Pass;

/// Distance from the scene center to a directional light camera.
pub const STANDOFF: f32 = 20.0;
/// Half the width and height of a directional light frustum.
pub const DIRECTIONAL_EXTENT: f32 = 10.0;
pub const DIRECTIONAL_NEAR: f32 = 1.0;
pub const DIRECTIONAL_FAR: f32 = 50.0;
pub const POINT_NEAR: f32 = 1.0;
pub const POINT_FAR: f32 = 25.0;

/// Look direction and up vector of each cube face, in layer order.
const CUBE_FACES: [([f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
];

/// The orthographic camera of a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightCamera {
    pub position: Point3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub projection: Matrix4<f32>,
}

impl LightCamera {
    /// A camera `STANDOFF` units away from `center`, looking at it along
    /// `direction`.
    pub fn new(center: Point3<f32>, direction: Vector3<f32>) -> Self {
        let front = direction.normalize();
        // Avoid a degenerate basis when the light points straight up or down.
        let up = if front.y.abs() > 0.99 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };

        let e = DIRECTIONAL_EXTENT;
        LightCamera {
            position: center - front * STANDOFF,
            front,
            up,
            projection: ortho(-e, e, -e, e, DIRECTIONAL_NEAR, DIRECTIONAL_FAR),
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_dir(self.position, self.front, self.up)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }
}

/// The six view-projections of a cube shadow map centered at `position`.
pub fn cube_matrices(position: Point3<f32>) -> [Matrix4<f32>; 6] {
    let projection = perspective(Deg(90.0), 1.0, POINT_NEAR, POINT_FAR);
    let face = |i: usize| {
        let (dir, up) = CUBE_FACES[i];
        projection * Matrix4::look_at(position, position + Vector3::from(dir), Vector3::from(up))
    };

    [face(0), face(1), face(2), face(3), face(4), face(5)]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShadowKind {
    Directional {
        camera: LightCamera,
        light_space: Matrix4<f32>,
    },
    Point {
        position: Point3<f32>,
        matrices: [Matrix4<f32>; 6],
        far_plane: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowEntry {
    pub texture: RenderTextureHandle,
    pub surface: SurfaceHandle,
    pub resolution: u32,
    pub kind: ShadowKind,
}

impl ShadowEntry {
    #[inline]
    pub fn is_cube(&self) -> bool {
        match self.kind {
            ShadowKind::Point { .. } => true,
            _ => false,
        }
    }
}

/// Shadow maps keyed by light name.
#[derive(Default)]
pub struct ShadowMaps {
    entries: FastHashMap<String, ShadowEntry>,
}

impl ShadowMaps {
    pub fn new() -> Self {
        ShadowMaps {
            entries: FastHashMap::default(),
        }
    }

    #[inline]
    pub fn get(&self, light: &str) -> Option<&ShadowEntry> {
        self.entries.get(light)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the shadow map of every light of `scene`. Maps are allocated
    /// the first time a light is seen and reallocated only if `resolution`
    /// changes. Returns the number of draw calls and triangles.
    pub fn update(
        &mut self,
        video: &mut dyn Visitor,
        shaders: &ShaderRegistry,
        resources: &SceneResources,
        scene: &Scene,
        resolution: u32,
    ) -> Result<(u32, u32)> {
        let mut draws = 0;
        let mut triangles = 0;

        for light in scene.lights() {
            let kind = match light.kind {
                LightKind::Directional => {
                    let camera = LightCamera::new(scene.center(), scene.light_direction(light));
                    ShadowKind::Directional {
                        camera,
                        light_space: camera.view_projection(),
                    }
                }
                LightKind::Point => {
                    let position = scene.light_position(light);
                    ShadowKind::Point {
                        position,
                        matrices: cube_matrices(position),
                        far_plane: POINT_FAR,
                    }
                }
            };

            let entry = self.allocate(video, light, resolution, kind)?;
            let t = render(video, shaders, resources, scene, &entry)?;
            draws += scene.draws().len() as u32;
            triangles += t;
        }

        Ok((draws, triangles))
    }

    fn allocate(
        &mut self,
        video: &mut dyn Visitor,
        light: &Light,
        resolution: u32,
        kind: ShadowKind,
    ) -> Result<ShadowEntry> {
        if let Some(v) = self.entries.get_mut(&light.name) {
            if v.resolution == resolution && v.is_cube() == light.is_point() {
                v.kind = kind;
                return Ok(*v);
            }
        }

        if let Some(v) = self.entries.remove(&light.name) {
            delete(video, &v)?;
        }

        let texture = video.create_render_texture(RenderTextureParams {
            kind: if light.is_point() {
                TextureKind::Cube
            } else {
                TextureKind::Texture2D
            },
            format: RenderTextureFormat::Depth24,
            wrap: if light.is_point() {
                TextureWrap::Clamp
            } else {
                TextureWrap::Border
            },
            filter: TextureFilter::Nearest,
            dimensions: Vector2::new(resolution, resolution),
            sampler: true,
            samples: 1,
        })?;

        let surface = video.create_surface(SurfaceParams::depth_only(texture))?;

        debug!(
            "Allocated {}x{} shadow map for light `{}`.",
            resolution, resolution, light.name
        );

        let entry = ShadowEntry {
            texture,
            surface,
            resolution,
            kind,
        };

        self.entries.insert(light.name.clone(), entry);
        Ok(entry)
    }

    /// Deletes every shadow map.
    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        for (name, v) in self.entries.drain() {
            debug!("Released shadow map of light `{}`.", name);
            delete(video, &v)?;
        }

        Ok(())
    }

    /// Draws the shadow map of `light` over `target`. Nothing is drawn if
    /// the light has no shadow map. Returns the number of triangles drawn,
    /// if any.
    pub fn draw_debug(
        &self,
        video: &mut dyn Visitor,
        shaders: &ShaderRegistry,
        resources: &SceneResources,
        light: &str,
        target: Option<SurfaceHandle>,
        dimensions: Vector2<u32>,
    ) -> Result<Option<u32>> {
        let entry = match self.entries.get(light) {
            Some(v) => v,
            None => return Ok(None),
        };

        let mut pass = PassScope::begin(video, Pass::ShadowDebug.label());
        pass.target(target, dimensions)?;
        pass.set_depth_test(false, Comparison::Always)?;
        pass.bind_shader(shaders.get(Program::ShadowDebug))?;

        match entry.kind {
            ShadowKind::Directional { .. } => {
                pass.bind_uniform("cube", UniformVariable::I32(0))?;
                pass.bind_uniform("depthMap", entry.texture.into())?;
                pass.bind_uniform("near", DIRECTIONAL_NEAR.into())?;
                pass.bind_uniform("farPlane", DIRECTIONAL_FAR.into())?;
            }
            ShadowKind::Point { far_plane, .. } => {
                pass.bind_uniform("cube", UniformVariable::I32(1))?;
                pass.bind_uniform("depthCube", entry.texture.into())?;
                pass.bind_uniform("near", POINT_NEAR.into())?;
                pass.bind_uniform("farPlane", far_plane.into())?;
            }
        }

        let triangles = pass.draw(resources.quad())?;
        Ok(Some(triangles))
    }
}

fn delete(video: &mut dyn Visitor, entry: &ShadowEntry) -> Result<()> {
    video.delete_surface(entry.surface)?;
    video.delete_render_texture(entry.texture)
}

fn render(
    video: &mut dyn Visitor,
    shaders: &ShaderRegistry,
    resources: &SceneResources,
    scene: &Scene,
    entry: &ShadowEntry,
) -> Result<u32> {
    let mut pass = PassScope::begin(video, Pass::Shadow.label());
    let size = Vector2::new(entry.resolution, entry.resolution);
    pass.target(Some(entry.surface), size)?;
    pass.clear(None, Some(1.0))?;

    match entry.kind {
        ShadowKind::Directional { light_space, .. } => {
            // Back faces only, so lit surfaces do not shadow themselves.
            let face = pass.ambient_cull_face().inverted();
            pass.set_cull_face(face)?;
            pass.bind_shader(shaders.get(Program::ShadowDepth))?;
            pass.bind_uniform("lightSpace", light_space.into())?;
        }
        ShadowKind::Point {
            position,
            matrices,
            far_plane,
        } => {
            pass.bind_shader(shaders.get(Program::CubeShadowDepth))?;
            for (i, v) in matrices.iter().enumerate() {
                pass.bind_uniform(&format!("shadowMatrices[{}]", i), (*v).into())?;
            }

            pass.bind_uniform("lightPos", position.to_vec().into())?;
            pass.bind_uniform("farPlane", far_plane.into())?;
        }
    }

    let mut triangles = 0;
    for draw in scene.draws() {
        pass.bind_uniform("model", draw.world.into())?;
        triangles += pass.draw(resources.mesh(draw.mesh).handle)?;
    }

    Ok(triangles)
}
