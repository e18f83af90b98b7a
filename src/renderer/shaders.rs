//! The fixed set of GPU programs used by the render passes.
//!
//! Each program is read from `<dir>/<name>.vert` and `<dir>/<name>.frag`,
//! plus `<dir>/<name>.geom` for programs with a geometry stage. Failing to
//! read, compile or link any of them is fatal.

use std::fs;
use std::path::Path;

use crate::errors::*;
use crate::video::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// Forward shading of lit meshes.
    Main,
    ShadowDepth,
    /// Renders the six faces of a cube shadow map in one layered pass.
    CubeShadowDepth,
    GeometryPass,
    LightingPass,
    Skybox,
    ScreenQuad,
    NormalsDebug,
    LightMarker,
    Ssao,
    SsaoBlur,
    ToneMap,
    ShadowDebug,
    Gradient,
}

impl Program {
    pub const ALL: [Program; 14] = [
        Program::Main,
        Program::ShadowDepth,
        Program::CubeShadowDepth,
        Program::GeometryPass,
        Program::LightingPass,
        Program::Skybox,
        Program::ScreenQuad,
        Program::NormalsDebug,
        Program::LightMarker,
        Program::Ssao,
        Program::SsaoBlur,
        Program::ToneMap,
        Program::ShadowDebug,
        Program::Gradient,
    ];

    /// The file stem of the program's sources.
    pub fn name(self) -> &'static str {
        match self {
            Program::Main => "main",
            Program::ShadowDepth => "shadow_depth",
            Program::CubeShadowDepth => "cube_shadow_depth",
            Program::GeometryPass => "gbuffer",
            Program::LightingPass => "deferred_lighting",
            Program::Skybox => "skybox",
            Program::ScreenQuad => "screen",
            Program::NormalsDebug => "normals",
            Program::LightMarker => "light_marker",
            Program::Ssao => "ssao",
            Program::SsaoBlur => "ssao_blur",
            Program::ToneMap => "tonemap",
            Program::ShadowDebug => "shadow_debug",
            Program::Gradient => "gradient",
        }
    }

    pub fn has_geometry(self) -> bool {
        match self {
            Program::CubeShadowDepth | Program::NormalsDebug => true,
            _ => false,
        }
    }
}

/// Every program of `Program::ALL`, compiled.
pub struct ShaderRegistry {
    shaders: Vec<ShaderHandle>,
}

impl ShaderRegistry {
    /// Reads and compiles every program from `dir`.
    pub fn load<P: AsRef<Path>>(video: &mut dyn Visitor, dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Loading shaders from {:?}.", dir);

        Self::from_sources(video, |program| {
            let read = |ext: &str| {
                let path = dir.join(format!("{}.{}", program.name(), ext));
                fs::read_to_string(&path)
                    .map_err(|err| format_err!("Failed to read shader {:?}: {}", path, err))
            };

            let params = ShaderParams::new(program.name(), read("vert")?, read("frag")?);
            if program.has_geometry() {
                Ok(params.with_geometry(read("geom")?))
            } else {
                Ok(params)
            }
        })
    }

    /// Compiles every program with the sources returned by `sources`.
    pub fn from_sources<F>(video: &mut dyn Visitor, mut sources: F) -> Result<Self>
    where
        F: FnMut(Program) -> Result<ShaderParams>,
    {
        let mut shaders = Vec::with_capacity(Program::ALL.len());
        for &program in Program::ALL.iter() {
            let params = sources(program)?;
            shaders.push(video.create_shader(params)?);
        }

        Ok(ShaderRegistry { shaders })
    }

    #[inline]
    pub fn get(&self, program: Program) -> ShaderHandle {
        self.shaders[program as usize]
    }

    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        for v in self.shaders.drain(..) {
            video.delete_shader(v)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::prelude::*;
    use std::io::Write;

    #[test]
    fn programs_are_indexed_in_order() {
        for (i, v) in Program::ALL.iter().enumerate() {
            assert_eq!(*v as usize, i);
        }
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        for program in Program::ALL.iter() {
            let mut exts = vec!["vert", "frag"];
            if program.has_geometry() {
                exts.push("geom");
            }

            for ext in exts {
                let path = dir.path().join(format!("{}.{}", program.name(), ext));
                let mut file = fs::File::create(path).unwrap();
                writeln!(file, "#version 330 core").unwrap();
            }
        }

        let mut video = RecordingVisitor::new(Vector2::new(64, 64));
        let mut shaders = ShaderRegistry::load(&mut video, dir.path()).unwrap();
        assert_eq!(video.count(|v| v.is_allocation()), Program::ALL.len());
        assert_eq!(
            video.calls()[Program::Skybox as usize],
            Call::CreateShader(shaders.get(Program::Skybox), "skybox".into())
        );

        shaders.release(&mut video).unwrap();
        assert_eq!(video.count(|v| v.is_deletion()), Program::ALL.len());

        fs::remove_file(dir.path().join("normals.geom")).unwrap();
        assert!(ShaderRegistry::load(&mut video, dir.path()).is_err());
    }
}
