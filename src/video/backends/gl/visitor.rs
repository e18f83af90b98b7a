use std::cell::RefCell;
use std::ffi::CString;
use std::mem;
use std::os::raw::c_void;
use std::ptr;

use gl;
use gl::types::*;
use smallvec::SmallVec;

use crate::errors::*;
use crate::math::prelude::{Vector2, Vector4};
use crate::utils::hash::FastHashMap;
use crate::video::assets::prelude::*;
use crate::video::MAX_TEXTURE_SLOTS;

use super::super::utils::Objects;
use super::super::Visitor;
use super::capabilities::{Capabilities, Version};
use super::types;

#[derive(Debug, Clone)]
struct GLShaderData {
    id: GLuint,
    name: String,
    uniforms: RefCell<FastHashMap<String, GLint>>,
}

impl GLShaderData {
    unsafe fn uniform_location(&self, name: &str) -> Result<GLint> {
        let mut uniforms = self.uniforms.borrow_mut();
        match uniforms.get(name).cloned() {
            Some(location) => Ok(location),
            None => {
                let c_name = CString::new(name.as_bytes())?;
                let location = gl::GetUniformLocation(self.id, c_name.as_ptr());
                check()?;

                if location == -1 {
                    debug!("Uniform `{}` is inactive in shader `{}`.", name, self.name);
                }

                uniforms.insert(name.to_owned(), location);
                Ok(location)
            }
        }
    }
}

#[derive(Debug, Clone)]
struct GLMeshData {
    vao: GLuint,
    vbos: SmallVec<[GLuint; 5]>,
    ibo: GLuint,
    params: MeshParams,
}

#[derive(Debug, Clone)]
struct GLTextureData {
    id: GLuint,
    params: TextureParams,
}

#[derive(Debug, Clone)]
struct GLRenderTextureData {
    id: GLuint,
    params: RenderTextureParams,
}

#[derive(Debug, Clone)]
struct GLSurfaceData {
    id: GLuint,
    params: SurfaceParams,
}

struct GLMutableState {
    surface: Option<SurfaceHandle>,
    viewport: SurfaceViewport,
    cull_face: CullFace,
    depth_write: bool,
    depth_test: Comparison,
    polygon_mode: PolygonMode,
    shader: Option<ShaderHandle>,
    units: FastHashMap<String, usize>,
    markers: usize,
}

pub struct GLVisitor {
    state: GLMutableState,
    capabilities: Capabilities,
    shaders: Objects<ShaderHandle, GLShaderData>,
    meshes: Objects<MeshHandle, GLMeshData>,
    textures: Objects<TextureHandle, GLTextureData>,
    render_textures: Objects<RenderTextureHandle, GLRenderTextureData>,
    surfaces: Objects<SurfaceHandle, GLSurfaceData>,
}

impl GLVisitor {
    /// Creates a visitor on the current context, whose default framebuffer
    /// has `dimensions`.
    pub unsafe fn new(dimensions: Vector2<u32>) -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);
        check_capabilities(&capabilities)?;

        let state = GLMutableState {
            surface: None,
            viewport: SurfaceViewport::new(dimensions),
            cull_face: CullFace::Nothing,
            depth_write: false,
            depth_test: Comparison::Always,
            polygon_mode: PolygonMode::Fill,
            shader: None,
            units: FastHashMap::default(),
            markers: 0,
        };

        let mut visitor = GLVisitor {
            state,
            capabilities,
            shaders: Objects::new(),
            meshes: Objects::new(),
            textures: Objects::new(),
            render_textures: Objects::new(),
            surfaces: Objects::new(),
        };

        visitor.reset_render_state()?;
        Ok(visitor)
    }

    unsafe fn reset_render_state(&mut self) -> Result<()> {
        gl::Disable(gl::CULL_FACE);
        gl::FrontFace(gl::CCW);
        gl::Disable(gl::DEPTH_TEST);
        gl::DepthMask(gl::FALSE);
        gl::DepthFunc(gl::ALWAYS);
        gl::PolygonMode(gl::FRONT_AND_BACK, gl::FILL);
        gl::Enable(gl::TEXTURE_CUBE_MAP_SEAMLESS);
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        let vp = self.state.viewport;
        gl::Viewport(vp.position.x, vp.position.y, vp.size.x as i32, vp.size.y as i32);
        check()
    }

    fn surface_id(&self, handle: Option<SurfaceHandle>) -> Result<GLuint> {
        match handle {
            Some(v) => self
                .surfaces
                .get(v)
                .map(|s| s.id)
                .ok_or_else(|| VideoError::HandleInvalid(v.to_string()).into()),
            None => Ok(0),
        }
    }

    fn render_texture(&self, handle: RenderTextureHandle) -> Result<&GLRenderTextureData> {
        self.render_textures
            .get(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()).into())
    }
}

impl Visitor for GLVisitor {
    fn create_shader(&mut self, params: ShaderParams) -> Result<ShaderHandle> {
        let id = unsafe {
            let mut stages = SmallVec::<[GLuint; 3]>::new();
            stages.push(compile(gl::VERTEX_SHADER, &params.vs, &params.name)?);
            stages.push(compile(gl::FRAGMENT_SHADER, &params.fs, &params.name)?);
            if let Some(ref gs) = params.gs {
                stages.push(compile(gl::GEOMETRY_SHADER, gs, &params.name)?);
            }

            let program = link(&stages, &params.name);
            for &v in &stages {
                if let Ok(ref id) = program {
                    gl::DetachShader(*id, v);
                }

                gl::DeleteShader(v);
            }

            check()?;
            program?
        };

        let shader = GLShaderData {
            id,
            name: params.name,
            uniforms: RefCell::new(FastHashMap::default()),
        };

        Ok(self.shaders.create(shader))
    }

    fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let shader = self
            .shaders
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        if self.state.shader == Some(handle) {
            self.state.shader = None;
        }

        unsafe {
            gl::DeleteProgram(shader.id);
            check()
        }
    }

    fn create_mesh(&mut self, data: &MeshData) -> Result<MeshHandle> {
        let params = data.params();
        if params.num_idxes % 3 != 0 {
            bail!("Mesh index count {} is not a multiple of 3.", params.num_idxes);
        }

        if let Some(&v) = data.indices.iter().find(|&&v| v as usize >= params.num_verts) {
            bail!("Mesh index {} is out of bounds ({}).", v, params.num_verts);
        }

        let mesh = unsafe {
            let mut vao = 0;
            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);

            let mut vbos = SmallVec::new();
            vbos.push(create_attribute(0, 3, &data.positions)?);
            if params.attributes.normals {
                vbos.push(create_attribute(1, 3, &data.normals)?);
            }

            if params.attributes.texcoords {
                vbos.push(create_attribute(2, 2, &data.texcoords)?);
            }

            if params.attributes.tangents {
                vbos.push(create_attribute(3, 3, &data.tangents)?);
            }

            if params.attributes.bitangents {
                vbos.push(create_attribute(4, 3, &data.bitangents)?);
            }

            let ibo = create_buffer(gl::ELEMENT_ARRAY_BUFFER, &data.indices)?;
            gl::BindVertexArray(0);
            check()?;

            GLMeshData {
                vao,
                vbos,
                ibo,
                params,
            }
        };

        Ok(self.meshes.create(mesh))
    }

    fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        let mesh = self
            .meshes
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        unsafe {
            gl::DeleteVertexArrays(1, &mesh.vao);
            gl::DeleteBuffers(mesh.vbos.len() as GLsizei, mesh.vbos.as_ptr());
            gl::DeleteBuffers(1, &mesh.ibo);
            check()
        }
    }

    fn create_texture(
        &mut self,
        params: TextureParams,
        data: TextureData,
    ) -> Result<TextureHandle> {
        params.validate(&data)?;

        let id = unsafe {
            let target = types::texture_target(params.kind);
            let mut id = 0;
            gl::GenTextures(1, &mut id);
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(target, id);

            let (internal_format, format, pixel_type) = types::texture_format(params.format);
            for (i, v) in data.layers.iter().enumerate() {
                gl::TexImage2D(
                    types::layer_target(params.kind, i),
                    0,
                    internal_format as GLint,
                    params.dimensions.x as GLsizei,
                    params.dimensions.y as GLsizei,
                    0,
                    format,
                    pixel_type,
                    v.as_ptr() as *const c_void,
                );
            }

            bind_texture_params(target, params.wrap, params.filter, params.mipmap);
            if params.mipmap {
                gl::GenerateMipmap(target);
            }

            check()?;
            id
        };

        Ok(self.textures.create(GLTextureData { id, params }))
    }

    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = self
            .textures
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        unsafe {
            gl::DeleteTextures(1, &texture.id);
            check()
        }
    }

    fn create_render_texture(
        &mut self,
        params: RenderTextureParams,
    ) -> Result<RenderTextureHandle> {
        params.validate()?;

        if u32::from(params.samples) > self.capabilities.max_samples.max(1) {
            let err = format!("{} samples", params.samples);
            return Err(VideoError::Requirement(err).into());
        }

        let (internal_format, format, pixel_type) = params.format.into();
        let (w, h) = (params.dimensions.x as GLsizei, params.dimensions.y as GLsizei);

        let id = unsafe {
            let mut id = 0;
            if params.sampler {
                let target = types::render_texture_target(&params);
                gl::GenTextures(1, &mut id);
                gl::ActiveTexture(gl::TEXTURE0);
                gl::BindTexture(target, id);

                if params.samples > 1 {
                    gl::TexImage2DMultisample(
                        target,
                        GLsizei::from(params.samples),
                        internal_format,
                        w,
                        h,
                        gl::TRUE,
                    );
                } else {
                    for i in 0..params.kind.layers() {
                        gl::TexImage2D(
                            types::layer_target(params.kind, i),
                            0,
                            internal_format as GLint,
                            w,
                            h,
                            0,
                            format,
                            pixel_type,
                            ptr::null(),
                        );
                    }

                    bind_texture_params(target, params.wrap, params.filter, false);
                }
            } else {
                gl::GenRenderbuffers(1, &mut id);
                gl::BindRenderbuffer(gl::RENDERBUFFER, id);

                if params.samples > 1 {
                    gl::RenderbufferStorageMultisample(
                        gl::RENDERBUFFER,
                        GLsizei::from(params.samples),
                        internal_format,
                        w,
                        h,
                    );
                } else {
                    gl::RenderbufferStorage(gl::RENDERBUFFER, internal_format, w, h);
                }
            }

            check()?;
            id
        };

        Ok(self
            .render_textures
            .create(GLRenderTextureData { id, params }))
    }

    fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()> {
        let rt = self
            .render_textures
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        unsafe {
            if rt.params.sampler {
                gl::DeleteTextures(1, &rt.id);
            } else {
                gl::DeleteRenderbuffers(1, &rt.id);
            }

            check()
        }
    }

    fn render_texture_params(&self, handle: RenderTextureHandle) -> Option<RenderTextureParams> {
        self.render_textures.get(handle).map(|v| v.params)
    }

    fn create_surface(&mut self, params: SurfaceParams) -> Result<SurfaceHandle> {
        let mut dimensions = None;
        let mut attachments = Vec::new();

        for (i, v) in params.colors.iter().enumerate() {
            if let Some(v) = *v {
                let rt = self.render_texture(v)?;
                if !rt.params.format.is_color() {
                    let err = format!("color attachment {} has format {:?}", i, rt.params.format);
                    return Err(VideoError::SurfaceIncomplete(err).into());
                }

                if dimensions.is_some() && dimensions != Some(rt.params.dimensions) {
                    let err = format!("color attachment {} has mismatched dimensions", i);
                    return Err(VideoError::SurfaceIncomplete(err).into());
                }

                dimensions = Some(rt.params.dimensions);
                attachments.push((gl::COLOR_ATTACHMENT0 + i as GLenum, rt.clone()));
            }
        }

        let colors = attachments.len();
        if let Some(v) = params.depth_stencil {
            let rt = self.render_texture(v)?;
            if rt.params.format.is_color() {
                let err = format!("depth attachment has format {:?}", rt.params.format);
                return Err(VideoError::SurfaceIncomplete(err).into());
            }

            if dimensions.is_some() && dimensions != Some(rt.params.dimensions) {
                let err = "depth attachment has mismatched dimensions".to_owned();
                return Err(VideoError::SurfaceIncomplete(err).into());
            }

            attachments.push((types::depth_attachment(rt.params.format), rt.clone()));
        }

        let previous = self.surface_id(self.state.surface)?;
        let id = unsafe {
            let mut id = 0;
            gl::GenFramebuffers(1, &mut id);
            gl::BindFramebuffer(gl::FRAMEBUFFER, id);

            for (location, rt) in &attachments {
                attach(*location, rt);
            }

            if colors == 0 {
                gl::DrawBuffer(gl::NONE);
                gl::ReadBuffer(gl::NONE);
            } else {
                let buffers: SmallVec<[GLenum; 4]> = (0..colors)
                    .map(|i| gl::COLOR_ATTACHMENT0 + i as GLenum)
                    .collect();
                gl::DrawBuffers(colors as GLsizei, buffers.as_ptr());
            }

            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
            gl::BindFramebuffer(gl::FRAMEBUFFER, previous);

            if status != gl::FRAMEBUFFER_COMPLETE {
                gl::DeleteFramebuffers(1, &id);
                let err = match status {
                    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => {
                        "not all attachment points are framebuffer attachment complete"
                    }
                    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
                        "no images are attached to the framebuffer"
                    }
                    gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => {
                        "attachments have different sample counts"
                    }
                    gl::FRAMEBUFFER_UNSUPPORTED => {
                        "the combination of internal formats is unsupported"
                    }
                    _ => "unknown status",
                };

                return Err(VideoError::SurfaceIncomplete(err.to_owned()).into());
            }

            check()?;
            id
        };

        Ok(self.surfaces.create(GLSurfaceData { id, params }))
    }

    fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        let surface = self
            .surfaces
            .free(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        unsafe {
            if self.state.surface == Some(handle) {
                gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
                self.state.surface = None;
            }

            gl::DeleteFramebuffers(1, &surface.id);
            check()
        }
    }

    fn bind_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()> {
        let id = self.surface_id(surface)?;
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, id);
            check()?;
        }

        self.state.surface = surface;
        Ok(())
    }

    #[inline]
    fn surface(&self) -> Option<SurfaceHandle> {
        self.state.surface
    }

    /// Set the viewport relative to the bottom-left corner of the surface, in pixels.
    fn set_viewport(&mut self, vp: SurfaceViewport) -> Result<()> {
        if self.state.viewport != vp {
            unsafe {
                gl::Viewport(vp.position.x, vp.position.y, vp.size.x as i32, vp.size.y as i32);
                check()?;
            }

            self.state.viewport = vp;
        }

        Ok(())
    }

    #[inline]
    fn viewport(&self) -> SurfaceViewport {
        self.state.viewport
    }

    /// Specify whether front- or back-facing polygons can be culled.
    fn set_cull_face(&mut self, face: CullFace) -> Result<()> {
        if self.state.cull_face != face {
            unsafe {
                match face {
                    CullFace::Nothing => gl::Disable(gl::CULL_FACE),
                    CullFace::Front => {
                        gl::Enable(gl::CULL_FACE);
                        gl::CullFace(gl::FRONT);
                    }
                    CullFace::Back => {
                        gl::Enable(gl::CULL_FACE);
                        gl::CullFace(gl::BACK);
                    }
                }

                check()?;
            }

            self.state.cull_face = face;
        }

        Ok(())
    }

    #[inline]
    fn cull_face(&self) -> CullFace {
        self.state.cull_face
    }

    fn set_depth_test(&mut self, write: bool, comparison: Comparison) -> Result<()> {
        let state = &mut self.state;

        unsafe {
            // Note that even if the depth buffer exists and the depth mask is non-zero,
            // the depth buffer is not updated if the depth test is disabled.
            let enable = comparison != Comparison::Always || write;
            let last_enable = state.depth_test != Comparison::Always || state.depth_write;
            if enable != last_enable {
                if enable {
                    gl::Enable(gl::DEPTH_TEST);
                } else {
                    gl::Disable(gl::DEPTH_TEST);
                }
            }

            if state.depth_write != write {
                gl::DepthMask(if write { gl::TRUE } else { gl::FALSE });
                state.depth_write = write;
            }

            if state.depth_test != comparison {
                gl::DepthFunc(comparison.into());
                state.depth_test = comparison;
            }

            check()
        }
    }

    #[inline]
    fn depth_test(&self) -> (bool, Comparison) {
        (self.state.depth_write, self.state.depth_test)
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()> {
        if self.state.polygon_mode != mode {
            unsafe {
                gl::PolygonMode(gl::FRONT_AND_BACK, mode.into());
                check()?;
            }

            self.state.polygon_mode = mode;
        }

        Ok(())
    }

    #[inline]
    fn polygon_mode(&self) -> PolygonMode {
        self.state.polygon_mode
    }

    fn clear(&mut self, color: Option<Vector4<f32>>, depth: Option<f32>) -> Result<()> {
        unsafe {
            let mut bits = 0;
            if let Some(v) = color {
                bits |= gl::COLOR_BUFFER_BIT;
                gl::ClearColor(v.x, v.y, v.z, v.w);
            }

            if let Some(v) = depth {
                bits |= gl::DEPTH_BUFFER_BIT;
                gl::ClearDepth(f64::from(v));

                // Depth writes must be enabled to clear the depth buffer.
                if !self.state.depth_write {
                    gl::DepthMask(gl::TRUE);
                }
            }

            if bits != 0 {
                gl::Clear(bits);
            }

            if depth.is_some() && !self.state.depth_write {
                gl::DepthMask(gl::FALSE);
            }

            check()
        }
    }

    fn blit(
        &mut self,
        src: Option<SurfaceHandle>,
        dst: Option<SurfaceHandle>,
        size: Vector2<u32>,
        mask: BlitMask,
    ) -> Result<()> {
        let src = self.surface_id(src)?;
        let dst = self.surface_id(dst)?;
        let current = self.surface_id(self.state.surface)?;
        let (w, h) = (size.x as GLint, size.y as GLint);

        unsafe {
            gl::BindFramebuffer(gl::READ_FRAMEBUFFER, src);
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, dst);
            gl::BlitFramebuffer(0, 0, w, h, 0, 0, w, h, mask.into(), gl::NEAREST);
            gl::BindFramebuffer(gl::FRAMEBUFFER, current);
            check()
        }
    }

    fn bind_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let shader = self
            .shaders
            .get(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        unsafe {
            gl::UseProgram(shader.id);
            check()?;
        }

        self.state.shader = Some(handle);
        self.state.units.clear();
        Ok(())
    }

    fn bind_uniform(&mut self, name: &str, variable: UniformVariable) -> Result<()> {
        let handle = self.state.shader.ok_or(VideoError::ShaderNotBound)?;
        let shader = self
            .shaders
            .get(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        unsafe {
            let location = shader.uniform_location(name)?;

            let (target, id) = match variable {
                UniformVariable::Texture(v) => {
                    let texture = self
                        .textures
                        .get(v)
                        .ok_or_else(|| VideoError::HandleInvalid(v.to_string()))?;
                    (types::texture_target(texture.params.kind), texture.id)
                }
                UniformVariable::RenderTexture(v) => {
                    let rt = self.render_texture(v)?;
                    if !rt.params.sampler {
                        bail!("{} does not have a sampler.", v);
                    }

                    (types::render_texture_target(&rt.params), rt.id)
                }
                _ => return bind_uniform_variable(location, &variable),
            };

            let next = self.state.units.len();
            let unit = *self.state.units.entry(name.to_owned()).or_insert(next);
            if unit >= MAX_TEXTURE_SLOTS
                || unit >= self.capabilities.max_texture_image_units as usize
            {
                self.state.units.remove(name);
                return Err(VideoError::TooManyTextureSlots(MAX_TEXTURE_SLOTS).into());
            }

            gl::ActiveTexture(gl::TEXTURE0 + unit as GLenum);
            gl::BindTexture(target, id);
            gl::Uniform1i(location, unit as GLint);
            check()
        }
    }

    fn draw(&mut self, handle: MeshHandle) -> Result<u32> {
        if self.state.shader.is_none() {
            return Err(VideoError::ShaderNotBound.into());
        }

        let mesh = self
            .meshes
            .get(handle)
            .ok_or_else(|| VideoError::HandleInvalid(handle.to_string()))?;

        unsafe {
            gl::BindVertexArray(mesh.vao);
            gl::DrawElements(
                gl::TRIANGLES,
                mesh.params.num_idxes as GLsizei,
                gl::UNSIGNED_INT,
                ptr::null(),
            );
            gl::BindVertexArray(0);
            check()?;
        }

        Ok(mesh.params.triangles())
    }

    fn push_marker(&mut self, label: &str) {
        self.state.markers += 1;
        if self.capabilities.debug_groups {
            if let Ok(label) = CString::new(label) {
                unsafe {
                    gl::PushDebugGroup(gl::DEBUG_SOURCE_APPLICATION, 0, -1, label.as_ptr());
                }
            }
        }
    }

    fn pop_marker(&mut self) {
        if self.state.markers == 0 {
            warn!("Unbalanced marker pop.");
            return;
        }

        self.state.markers -= 1;
        if self.capabilities.debug_groups {
            unsafe {
                gl::PopDebugGroup();
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        unsafe {
            gl::Flush();
            check()
        }
    }
}

impl Drop for GLVisitor {
    fn drop(&mut self) {
        unsafe {
            for v in self.surfaces.iter() {
                gl::DeleteFramebuffers(1, &v.id);
            }

            for v in self.render_textures.iter() {
                if v.params.sampler {
                    gl::DeleteTextures(1, &v.id);
                } else {
                    gl::DeleteRenderbuffers(1, &v.id);
                }
            }

            for v in self.textures.iter() {
                gl::DeleteTextures(1, &v.id);
            }

            for v in self.meshes.iter() {
                gl::DeleteVertexArrays(1, &v.vao);
                gl::DeleteBuffers(v.vbos.len() as GLsizei, v.vbos.as_ptr());
                gl::DeleteBuffers(1, &v.ibo);
            }

            for v in self.shaders.iter() {
                gl::DeleteProgram(v.id);
            }
        }
    }
}

unsafe fn attach(location: GLenum, rt: &GLRenderTextureData) {
    if rt.params.sampler {
        match rt.params.kind {
            // Layered attachment, faces are selected with `gl_Layer`.
            TextureKind::Cube => gl::FramebufferTexture(gl::FRAMEBUFFER, location, rt.id, 0),
            TextureKind::Texture2D => gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                location,
                types::render_texture_target(&rt.params),
                rt.id,
                0,
            ),
        }
    } else {
        gl::FramebufferRenderbuffer(gl::FRAMEBUFFER, location, gl::RENDERBUFFER, rt.id);
    }
}

unsafe fn bind_uniform_variable(location: GLint, variable: &UniformVariable) -> Result<()> {
    match *variable {
        UniformVariable::Texture(_) | UniformVariable::RenderTexture(_) => unreachable!(),
        UniformVariable::I32(v) => gl::Uniform1i(location, v),
        UniformVariable::F32(v) => gl::Uniform1f(location, v),
        UniformVariable::Vector2f(v) => gl::Uniform2f(location, v[0], v[1]),
        UniformVariable::Vector3f(v) => gl::Uniform3f(location, v[0], v[1], v[2]),
        UniformVariable::Vector4f(v) => gl::Uniform4f(location, v[0], v[1], v[2], v[3]),
        UniformVariable::Matrix4f(v) => gl::UniformMatrix4fv(location, 1, gl::FALSE, v[0].as_ptr()),
    }

    check()
}

unsafe fn bind_texture_params(target: GLenum, wrap: TextureWrap, filter: TextureFilter, mipmap: bool) {
    let wrap: GLenum = wrap.into();
    gl::TexParameteri(target, gl::TEXTURE_WRAP_S, wrap as GLint);
    gl::TexParameteri(target, gl::TEXTURE_WRAP_T, wrap as GLint);
    gl::TexParameteri(target, gl::TEXTURE_WRAP_R, wrap as GLint);

    if wrap == gl::CLAMP_TO_BORDER {
        let white = [1.0f32, 1.0, 1.0, 1.0];
        gl::TexParameterfv(target, gl::TEXTURE_BORDER_COLOR, white.as_ptr());
    }

    let (min_filter, mag_filter) = match filter {
        TextureFilter::Nearest if mipmap => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
        TextureFilter::Nearest => (gl::NEAREST, gl::NEAREST),
        TextureFilter::Linear if mipmap => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
        TextureFilter::Linear => (gl::LINEAR, gl::LINEAR),
    };

    gl::TexParameteri(target, gl::TEXTURE_MIN_FILTER, min_filter as GLint);
    gl::TexParameteri(target, gl::TEXTURE_MAG_FILTER, mag_filter as GLint);
}

unsafe fn create_buffer<T>(tp: GLenum, data: &[T]) -> Result<GLuint> {
    let mut id = 0;
    gl::GenBuffers(1, &mut id);
    gl::BindBuffer(tp, id);

    let size = (data.len() * mem::size_of::<T>()) as GLsizeiptr;
    let value = if data.is_empty() {
        ptr::null()
    } else {
        data.as_ptr() as *const c_void
    };

    gl::BufferData(tp, size, value, gl::STATIC_DRAW);
    check()?;
    Ok(id)
}

/// Uploads one vertex attribute of `components` floats into its own buffer.
unsafe fn create_attribute<T>(location: GLuint, components: GLint, data: &[T]) -> Result<GLuint> {
    let id = create_buffer(gl::ARRAY_BUFFER, data)?;
    gl::EnableVertexAttribArray(location);
    gl::VertexAttribPointer(location, components, gl::FLOAT, gl::FALSE, 0, ptr::null());
    check()?;
    Ok(id)
}

unsafe fn compile(stage: GLenum, src: &str, name: &str) -> Result<GLuint> {
    let shader = gl::CreateShader(stage);
    let c_str = CString::new(src.as_bytes())?;
    gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
    gl::CompileShader(shader);

    let mut status = GLint::from(gl::FALSE);
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

    if status != GLint::from(gl::TRUE) {
        let mut len = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];
        gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
        gl::DeleteShader(shader);

        let log = String::from_utf8_lossy(&buf).trim_end_matches('\0').to_owned();
        Err(VideoError::ShaderCreationFailure(name.to_owned(), log).into())
    } else {
        Ok(shader)
    }
}

unsafe fn link(shaders: &[GLuint], name: &str) -> Result<GLuint> {
    let program = gl::CreateProgram();
    for &shader in shaders {
        gl::AttachShader(program, shader);
    }

    gl::LinkProgram(program);

    let mut status = GLint::from(gl::FALSE);
    gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

    if status != GLint::from(gl::TRUE) {
        let mut len: GLint = 0;
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];
        gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
        gl::DeleteProgram(program);

        let log = String::from_utf8_lossy(&buf).trim_end_matches('\0').to_owned();
        Err(VideoError::ShaderCreationFailure(name.to_owned(), log).into())
    } else {
        Ok(program)
    }
}

fn check_capabilities(caps: &Capabilities) -> Result<()> {
    // Geometry shaders, layered rendering and multisampled textures.
    if caps.version < Version::GL(3, 3) {
        return Err(VideoError::Requirement("OpenGL 3.3".to_owned()).into());
    }

    if (caps.max_texture_image_units as usize) < MAX_TEXTURE_SLOTS {
        let err = format!("{} texture image units", MAX_TEXTURE_SLOTS);
        return Err(VideoError::Requirement(err).into());
    }

    if (caps.max_color_attachments as usize) < crate::video::MAX_ATTACHMENTS {
        let err = format!("{} color attachments", crate::video::MAX_ATTACHMENTS);
        return Err(VideoError::Requirement(err).into());
    }

    Ok(())
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => {
            bail!("[GL] An unacceptable value is specified for an enumerated argument.")
        }

        gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),

        gl::INVALID_OPERATION => {
            bail!("[GL] The specified operation is not allowed in the current state.")
        }

        gl::INVALID_FRAMEBUFFER_OPERATION => bail!(
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        ),

        gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        _ => bail!("[GL] Oops, Unknown OpenGL error."),
    }
}
