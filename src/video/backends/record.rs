//! A headless `Visitor` which executes nothing and records every call.
//!
//! It keeps the same bookkeeping as the OpenGL backend (alive handles, bound
//! surface, viewport, cull face and texture units) and reports the same
//! errors, which makes it suitable for testing pass orchestration.

use crate::errors::*;
use crate::math::prelude::{Vector2, Vector4};
use crate::utils::hash::FastHashMap;
use crate::video::assets::prelude::*;
use crate::video::MAX_TEXTURE_SLOTS;

use super::utils::Objects;
use super::Visitor;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderHandle, String),
    DeleteShader(ShaderHandle),
    CreateMesh(MeshHandle, MeshParams),
    DeleteMesh(MeshHandle),
    CreateTexture(TextureHandle, TextureParams),
    DeleteTexture(TextureHandle),
    CreateRenderTexture(RenderTextureHandle, RenderTextureParams),
    DeleteRenderTexture(RenderTextureHandle),
    CreateSurface(SurfaceHandle, SurfaceParams),
    DeleteSurface(SurfaceHandle),
    BindSurface(Option<SurfaceHandle>),
    SetViewport(SurfaceViewport),
    SetCullFace(CullFace),
    SetDepthTest(bool, Comparison),
    SetPolygonMode(PolygonMode),
    Clear { color: bool, depth: bool },
    Blit {
        src: Option<SurfaceHandle>,
        dst: Option<SurfaceHandle>,
        size: Vector2<u32>,
        mask: BlitMask,
    },
    BindShader(ShaderHandle),
    BindUniform(String, UniformVariable),
    Draw {
        shader: ShaderHandle,
        mesh: MeshHandle,
        surface: Option<SurfaceHandle>,
        triangles: u32,
    },
    PushMarker(String),
    PopMarker,
    Flush,
}

impl Call {
    /// Returns true if this call allocates a GPU object.
    pub fn is_allocation(&self) -> bool {
        match *self {
            Call::CreateShader(..)
            | Call::CreateMesh(..)
            | Call::CreateTexture(..)
            | Call::CreateRenderTexture(..)
            | Call::CreateSurface(..) => true,
            _ => false,
        }
    }

    /// Returns true if this call releases a GPU object.
    pub fn is_deletion(&self) -> bool {
        match *self {
            Call::DeleteShader(..)
            | Call::DeleteMesh(..)
            | Call::DeleteTexture(..)
            | Call::DeleteRenderTexture(..)
            | Call::DeleteSurface(..) => true,
            _ => false,
        }
    }

    pub fn is_draw(&self) -> bool {
        match *self {
            Call::Draw { .. } => true,
            _ => false,
        }
    }
}

pub struct RecordingVisitor {
    calls: Vec<Call>,
    shaders: Objects<ShaderHandle, String>,
    meshes: Objects<MeshHandle, MeshParams>,
    textures: Objects<TextureHandle, TextureParams>,
    render_textures: Objects<RenderTextureHandle, RenderTextureParams>,
    surfaces: Objects<SurfaceHandle, SurfaceParams>,
    surface: Option<SurfaceHandle>,
    viewport: SurfaceViewport,
    cull_face: CullFace,
    depth_write: bool,
    depth_test: Comparison,
    polygon_mode: PolygonMode,
    shader: Option<ShaderHandle>,
    units: FastHashMap<String, usize>,
    markers: Vec<String>,
}

impl RecordingVisitor {
    /// Creates a recorder whose default framebuffer has `dimensions`.
    pub fn new(dimensions: Vector2<u32>) -> Self {
        RecordingVisitor {
            calls: Vec::new(),
            shaders: Objects::new(),
            meshes: Objects::new(),
            textures: Objects::new(),
            render_textures: Objects::new(),
            surfaces: Objects::new(),
            surface: None,
            viewport: SurfaceViewport::new(dimensions),
            cull_face: CullFace::Nothing,
            depth_write: false,
            depth_test: Comparison::Always,
            polygon_mode: PolygonMode::Fill,
            shader: None,
            units: FastHashMap::default(),
            markers: Vec::new(),
        }
    }

    /// All calls recorded so far.
    #[inline]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Drains the recorded calls, keeping the simulated state.
    pub fn take_calls(&mut self) -> Vec<Call> {
        ::std::mem::replace(&mut self.calls, Vec::new())
    }

    pub fn count<F>(&self, filter: F) -> usize
    where
        F: Fn(&Call) -> bool,
    {
        self.calls.iter().filter(|v| filter(v)).count()
    }

    /// Labels of the outermost markers, in recording order.
    pub fn markers(&self) -> Vec<String> {
        let mut depth = 0;
        let mut labels = Vec::new();
        for call in &self.calls {
            match *call {
                Call::PushMarker(ref label) => {
                    if depth == 0 {
                        labels.push(label.clone());
                    }
                    depth += 1;
                }
                Call::PopMarker => depth -= 1,
                _ => {}
            }
        }

        labels
    }

    /// Every group of calls recorded between a `label` marker and its
    /// matching pop, markers excluded.
    pub fn sections(&self, label: &str) -> Vec<&[Call]> {
        let mut sections = Vec::new();
        for (i, call) in self.calls.iter().enumerate() {
            if *call != Call::PushMarker(label.to_owned()) {
                continue;
            }

            let mut depth = 0;
            for (j, v) in self.calls[i + 1..].iter().enumerate() {
                match *v {
                    Call::PushMarker(_) => depth += 1,
                    Call::PopMarker if depth == 0 => {
                        sections.push(&self.calls[i + 1..i + 1 + j]);
                        break;
                    }
                    Call::PopMarker => depth -= 1,
                    _ => {}
                }
            }
        }

        sections
    }

    #[inline]
    pub fn alive_render_textures(&self) -> usize {
        self.render_textures.len()
    }

    #[inline]
    pub fn alive_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn alive_textures(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    pub fn alive_meshes(&self) -> usize {
        self.meshes.len()
    }
}

impl Visitor for RecordingVisitor {
    fn create_shader(&mut self, params: ShaderParams) -> Result<ShaderHandle> {
        let handle = self.shaders.create(params.name.clone());
        self.calls.push(Call::CreateShader(handle, params.name));
        Ok(handle)
    }

    fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        self.shaders
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        if self.shader == Some(handle) {
            self.shader = None;
        }

        self.calls.push(Call::DeleteShader(handle));
        Ok(())
    }

    fn create_mesh(&mut self, data: &MeshData) -> Result<MeshHandle> {
        let params = data.params();
        if params.num_idxes % 3 != 0 {
            bail!("Mesh index count {} is not a multiple of 3.", params.num_idxes);
        }

        if let Some(&v) = data.indices.iter().find(|&&v| v as usize >= params.num_verts) {
            bail!("Mesh index {} is out of bounds ({}).", v, params.num_verts);
        }

        let handle = self.meshes.create(params);
        self.calls.push(Call::CreateMesh(handle, params));
        Ok(handle)
    }

    fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        self.meshes
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;
        self.calls.push(Call::DeleteMesh(handle));
        Ok(())
    }

    fn create_texture(
        &mut self,
        params: TextureParams,
        data: TextureData,
    ) -> Result<TextureHandle> {
        params.validate(&data)?;
        let handle = self.textures.create(params);
        self.calls.push(Call::CreateTexture(handle, params));
        Ok(handle)
    }

    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        self.textures
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;
        self.calls.push(Call::DeleteTexture(handle));
        Ok(())
    }

    fn create_render_texture(
        &mut self,
        params: RenderTextureParams,
    ) -> Result<RenderTextureHandle> {
        params.validate()?;
        let handle = self.render_textures.create(params);
        self.calls.push(Call::CreateRenderTexture(handle, params));
        Ok(handle)
    }

    fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()> {
        self.render_textures
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;
        self.calls.push(Call::DeleteRenderTexture(handle));
        Ok(())
    }

    fn render_texture_params(&self, handle: RenderTextureHandle) -> Option<RenderTextureParams> {
        self.render_textures.get(handle).cloned()
    }

    fn create_surface(&mut self, params: SurfaceParams) -> Result<SurfaceHandle> {
        let mut dimensions = None;
        let mut samples = None;

        for (i, v) in params.colors.iter().enumerate() {
            if let Some(v) = *v {
                let rt = self
                    .render_textures
                    .get(v)
                    .ok_or_else(|| VideoError::HandleInvalid(v.to_string()))?;

                if !rt.format.is_color() {
                    let err = format!("color attachment {} has format {:?}", i, rt.format);
                    return Err(VideoError::SurfaceIncomplete(err).into());
                }

                check_attachment(rt, &mut dimensions, &mut samples)?;
            }
        }

        if let Some(v) = params.depth_stencil {
            let rt = self
                .render_textures
                .get(v)
                .ok_or_else(|| VideoError::HandleInvalid(v.to_string()))?;

            if rt.format.is_color() {
                let err = format!("depth attachment has format {:?}", rt.format);
                return Err(VideoError::SurfaceIncomplete(err).into());
            }

            check_attachment(rt, &mut dimensions, &mut samples)?;
        }

        if dimensions.is_none() {
            let err = "no images are attached".to_owned();
            return Err(VideoError::SurfaceIncomplete(err).into());
        }

        let handle = self.surfaces.create(params);
        self.calls.push(Call::CreateSurface(handle, params));
        Ok(handle)
    }

    fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        self.surfaces
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        if self.surface == Some(handle) {
            self.surface = None;
        }

        self.calls.push(Call::DeleteSurface(handle));
        Ok(())
    }

    fn bind_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()> {
        if let Some(v) = surface {
            if self.surfaces.get(v).is_none() {
                return Err(VideoError::HandleInvalid(v.to_string()).into());
            }
        }

        self.surface = surface;
        self.calls.push(Call::BindSurface(surface));
        Ok(())
    }

    #[inline]
    fn surface(&self) -> Option<SurfaceHandle> {
        self.surface
    }

    fn set_viewport(&mut self, vp: SurfaceViewport) -> Result<()> {
        self.viewport = vp;
        self.calls.push(Call::SetViewport(vp));
        Ok(())
    }

    #[inline]
    fn viewport(&self) -> SurfaceViewport {
        self.viewport
    }

    fn set_cull_face(&mut self, face: CullFace) -> Result<()> {
        self.cull_face = face;
        self.calls.push(Call::SetCullFace(face));
        Ok(())
    }

    #[inline]
    fn cull_face(&self) -> CullFace {
        self.cull_face
    }

    fn set_depth_test(&mut self, write: bool, comparison: Comparison) -> Result<()> {
        self.depth_write = write;
        self.depth_test = comparison;
        self.calls.push(Call::SetDepthTest(write, comparison));
        Ok(())
    }

    #[inline]
    fn depth_test(&self) -> (bool, Comparison) {
        (self.depth_write, self.depth_test)
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()> {
        self.polygon_mode = mode;
        self.calls.push(Call::SetPolygonMode(mode));
        Ok(())
    }

    #[inline]
    fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    fn clear(&mut self, color: Option<Vector4<f32>>, depth: Option<f32>) -> Result<()> {
        self.calls.push(Call::Clear {
            color: color.is_some(),
            depth: depth.is_some(),
        });
        Ok(())
    }

    fn blit(
        &mut self,
        src: Option<SurfaceHandle>,
        dst: Option<SurfaceHandle>,
        size: Vector2<u32>,
        mask: BlitMask,
    ) -> Result<()> {
        for v in src.iter().chain(dst.iter()) {
            if self.surfaces.get(*v).is_none() {
                return Err(VideoError::HandleInvalid(v.to_string()).into());
            }
        }

        self.calls.push(Call::Blit {
            src,
            dst,
            size,
            mask,
        });
        Ok(())
    }

    fn bind_shader(&mut self, shader: ShaderHandle) -> Result<()> {
        if self.shaders.get(shader).is_none() {
            return Err(VideoError::HandleInvalid(shader.to_string()).into());
        }

        self.shader = Some(shader);
        self.units.clear();
        self.calls.push(Call::BindShader(shader));
        Ok(())
    }

    fn bind_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()> {
        if self.shader.is_none() {
            return Err(VideoError::ShaderNotBound.into());
        }

        match variable {
            UniformVariable::Texture(v) if self.textures.get(v).is_none() => {
                return Err(VideoError::HandleInvalid(v.to_string()).into());
            }
            UniformVariable::RenderTexture(v) => match self.render_textures.get(v) {
                Some(rt) if !rt.sampler => bail!("{} does not have a sampler.", v),
                None => return Err(VideoError::HandleInvalid(v.to_string()).into()),
                _ => {}
            },
            _ => {}
        }

        if variable.is_sampler() && !self.units.contains_key(name) {
            let unit = self.units.len();
            if unit >= MAX_TEXTURE_SLOTS {
                return Err(VideoError::TooManyTextureSlots(MAX_TEXTURE_SLOTS).into());
            }

            self.units.insert(name.to_owned(), unit);
        }

        self.calls.push(Call::BindUniform(name.to_owned(), variable));
        Ok(())
    }

    fn draw(&mut self, mesh: MeshHandle) -> Result<u32> {
        let shader = self.shader.ok_or(VideoError::ShaderNotBound)?;
        let triangles = self
            .meshes
            .get(mesh)
            .ok_or_else(|| VideoError::HandleInvalid(mesh.to_string()))?
            .triangles();

        self.calls.push(Call::Draw {
            shader,
            mesh,
            surface: self.surface,
            triangles,
        });

        Ok(triangles)
    }

    fn push_marker(&mut self, label: &str) {
        self.markers.push(label.to_owned());
        self.calls.push(Call::PushMarker(label.to_owned()));
    }

    fn pop_marker(&mut self) {
        if self.markers.pop().is_some() {
            self.calls.push(Call::PopMarker);
        } else {
            warn!("Unbalanced marker pop.");
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.calls.push(Call::Flush);
        Ok(())
    }
}

fn check_attachment(
    rt: &RenderTextureParams,
    dimensions: &mut Option<Vector2<u32>>,
    samples: &mut Option<u8>,
) -> Result<()> {
    if dimensions.is_some() && *dimensions != Some(rt.dimensions) {
        let err = format!(
            "attachment dimensions {:?} mismatch {:?}",
            rt.dimensions,
            dimensions.unwrap_or(rt.dimensions)
        );
        return Err(VideoError::SurfaceIncomplete(err).into());
    }

    if samples.is_some() && *samples != Some(rt.samples) {
        let err = "attachments have different sample counts".to_owned();
        return Err(VideoError::SurfaceIncomplete(err).into());
    }

    *dimensions = Some(rt.dimensions);
    *samples = Some(rt.samples);
    Ok(())
}
