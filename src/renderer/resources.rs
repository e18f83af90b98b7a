//! GPU copies of the scene: one mesh per scene mesh, the primitives used by
//! the screen space passes, textures cached by path and the skybox.

use std::path::{Path, PathBuf};

use crate::errors::*;
use crate::math::prelude::*;
use crate::scene::{MeshId, Scene};
use crate::utils::hash::FastHashMap;
use crate::video::prelude::*;

/// The GPU record of a scene mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRecord {
    pub handle: MeshHandle,
    pub params: MeshParams,
    pub material: usize,
}

pub struct SceneResources {
    meshes: Vec<MeshRecord>,
    cube: MeshHandle,
    quad: MeshHandle,
    // Failed loads are cached as `None` so they are reported once.
    textures: FastHashMap<PathBuf, Option<TextureHandle>>,
    skybox: Option<TextureHandle>,
}

impl SceneResources {
    /// Uploads every mesh of `scene` and the skybox faces, if any. Material
    /// textures are loaded when they are first bound.
    pub fn load(
        video: &mut dyn Visitor,
        scene: &Scene,
        skybox: Option<&[PathBuf; 6]>,
    ) -> Result<Self> {
        let mut meshes = Vec::with_capacity(scene.meshes().len());
        for id in scene.mesh_ids() {
            let mesh = scene.mesh(id);
            let data = mesh.to_mesh_data();
            meshes.push(MeshRecord {
                handle: video.create_mesh(&data)?,
                params: data.params(),
                material: mesh.material,
            });
        }

        let cube = video.create_mesh(&MeshData::cube())?;
        let quad = video.create_mesh(&MeshData::quad())?;

        let skybox = match skybox {
            Some(faces) => match decode_cube(faces) {
                Ok((params, data)) => Some(video.create_texture(params, data)?),
                Err(err) => {
                    warn!("Failed to load skybox: {}", err);
                    None
                }
            },
            None => None,
        };

        info!(
            "Uploaded {} meshes, skybox: {}.",
            meshes.len(),
            skybox.is_some()
        );

        Ok(SceneResources {
            meshes,
            cube,
            quad,
            textures: FastHashMap::default(),
            skybox,
        })
    }

    #[inline]
    pub fn mesh(&self, id: MeshId) -> &MeshRecord {
        &self.meshes[id.index()]
    }

    #[inline]
    pub fn meshes(&self) -> &[MeshRecord] {
        &self.meshes
    }

    /// A unit cube centered at the origin.
    #[inline]
    pub fn cube(&self) -> MeshHandle {
        self.cube
    }

    /// A quad covering the screen in normalized device coordinates.
    #[inline]
    pub fn quad(&self) -> MeshHandle {
        self.quad
    }

    #[inline]
    pub fn skybox(&self) -> Option<TextureHandle> {
        self.skybox
    }

    /// Returns the texture at `path`, loading it on first use. Files that
    /// could not be read are logged once and yield `None` from then on.
    pub fn texture(&mut self, video: &mut dyn Visitor, path: &Path) -> Result<Option<TextureHandle>> {
        if let Some(&v) = self.textures.get(path) {
            return Ok(v);
        }

        let handle = match decode(path) {
            Ok((params, data)) => {
                debug!("Loaded texture {:?} {:?}.", path, params.dimensions);
                Some(video.create_texture(params, data)?)
            }
            Err(err) => {
                warn!("Failed to load texture {:?}: {}", path, err);
                None
            }
        };

        self.textures.insert(path.to_owned(), handle);
        Ok(handle)
    }

    /// Number of paths that have been looked up, including failed ones.
    #[inline]
    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        for v in self.meshes.drain(..) {
            video.delete_mesh(v.handle)?;
        }

        video.delete_mesh(self.cube)?;
        video.delete_mesh(self.quad)?;

        for (_, v) in self.textures.drain() {
            if let Some(v) = v {
                video.delete_texture(v)?;
            }
        }

        if let Some(v) = self.skybox.take() {
            video.delete_texture(v)?;
        }

        Ok(())
    }
}

fn decode(path: &Path) -> Result<(TextureParams, TextureData)> {
    // Images are stored top row first, OpenGL expects the bottom row first.
    let rgba = image::open(path)?.flipv().to_rgba();
    let (width, height) = rgba.dimensions();

    let params = TextureParams {
        format: TextureFormat::RGBA8,
        dimensions: Vector2::new(width, height),
        ..Default::default()
    };

    let data = TextureData {
        layers: vec![rgba.into_raw()],
    };

    Ok((params, data))
}

fn decode_cube(faces: &[PathBuf; 6]) -> Result<(TextureParams, TextureData)> {
    let mut dimensions = None;
    let mut layers = Vec::with_capacity(6);

    for path in faces.iter() {
        let rgba = image::open(path)
            .map_err(|err| format_err!("{:?}: {}", path, err))?
            .to_rgba();

        let (width, height) = rgba.dimensions();
        match dimensions {
            Some(v) if v != Vector2::new(width, height) => {
                bail!("Skybox face {:?} is {}x{}, expected {:?}.", path, width, height, v);
            }
            _ => dimensions = Some(Vector2::new(width, height)),
        }

        layers.push(rgba.into_raw());
    }

    let params = TextureParams {
        kind: TextureKind::Cube,
        format: TextureFormat::RGBA8,
        wrap: TextureWrap::Clamp,
        filter: TextureFilter::Linear,
        mipmap: false,
        dimensions: dimensions.unwrap_or_else(|| Vector2::new(0, 0)),
    };

    Ok((params, TextureData { layers }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::{Material, Mesh, Node};

    fn scene() -> Scene {
        let mut root = Node::new("root");
        root.meshes = vec![0, 0];

        let mesh = Mesh {
            name: "triangle".into(),
            positions: vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![vec![0, 1, 2]],
            ..Default::default()
        };

        Scene::new(vec![root], 0, vec![mesh], vec![], vec![Material::default()]).unwrap()
    }

    #[test]
    fn texture_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        image::RgbaImage::new(4, 2).save(&path).unwrap();

        let mut video = RecordingVisitor::new(Vector2::new(64, 64));
        let scene = scene();
        let mut resources = SceneResources::load(&mut video, &scene, None).unwrap();
        assert_eq!(video.alive_meshes(), 3);
        assert_eq!(resources.mesh(scene.mesh_ids().next().unwrap()).params.triangles(), 1);

        let texture = resources.texture(&mut video, &path).unwrap();
        assert!(texture.is_some());
        assert_eq!(resources.texture(&mut video, &path).unwrap(), texture);
        assert_eq!(video.alive_textures(), 1);

        let missing = dir.path().join("missing.png");
        assert_eq!(resources.texture(&mut video, &missing).unwrap(), None);
        assert_eq!(resources.texture(&mut video, &missing).unwrap(), None);
        assert_eq!(resources.cached_textures(), 2);

        resources.release(&mut video).unwrap();
        assert_eq!(video.alive_meshes(), 0);
        assert_eq!(video.alive_textures(), 0);
    }
}
