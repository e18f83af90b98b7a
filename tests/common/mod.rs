#![allow(dead_code)]

use std::path::{Path, PathBuf};

use eduren::prelude::*;

pub const DIMENSIONS: [u32; 2] = [800, 600];

pub fn dimensions() -> Vector2<u32> {
    Vector2::new(DIMENSIONS[0], DIMENSIONS[1])
}

/// Compiles every program from empty sources, the recorder never compiles.
pub fn shaders(video: &mut RecordingVisitor) -> ShaderRegistry {
    ShaderRegistry::from_sources(video, |program| {
        Ok(ShaderParams::new(program.name(), "", ""))
    })
    .unwrap()
}

/// A floor quad and a triangle under one root node, one directional light
/// named `sun` if `directional` and `points` point lights named `lamp<i>`.
pub fn scene(directional: bool, points: usize) -> Scene {
    scene_with_material(directional, points, Material::default(), false)
}

pub fn scene_with_material(
    directional: bool,
    points: usize,
    material: Material,
    tangents: bool,
) -> Scene {
    let mut root = Node::new("root");
    root.meshes = vec![0, 1];

    let mut nodes = vec![root];
    let mut lights = Vec::new();

    if directional {
        let mut sun = Node::new("sun");
        sun.transform = Matrix4::from_angle_x(Deg(-45.0));
        nodes.push(sun);
        lights.push(Light::directional("sun", Vector3::new(0.0, 0.0, -1.0)));
    }

    for i in 0..points {
        let name = format!("lamp{}", i);
        let mut lamp = Node::new(name.as_str());
        lamp.transform = Matrix4::from_translation(Vector3::new(i as f32, 2.0, 0.0));
        nodes.push(lamp);
        lights.push(Light::point(name));
    }

    nodes[0].children = (1..nodes.len()).collect();

    let up = Vector3::unit_y();
    let mut floor = Mesh {
        name: "floor".into(),
        positions: vec![
            Vector3::new(-5.0, 0.0, -5.0),
            Vector3::new(5.0, 0.0, -5.0),
            Vector3::new(5.0, 0.0, 5.0),
            Vector3::new(-5.0, 0.0, 5.0),
        ],
        normals: vec![up; 4],
        texcoords: vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ],
        faces: vec![vec![0, 2, 1], vec![0, 3, 2]],
        material: 0,
        ..Default::default()
    };

    let mut triangle = Mesh {
        name: "triangle".into(),
        positions: vec![
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
        ],
        normals: vec![Vector3::unit_z(); 3],
        faces: vec![vec![0, 1, 2]],
        material: 0,
        ..Default::default()
    };

    if tangents {
        for mesh in [&mut floor, &mut triangle].iter_mut() {
            let len = mesh.positions.len();
            mesh.tangents = vec![Vector3::unit_x(); len];
            mesh.bitangents = vec![Vector3::unit_z(); len];
        }
    }

    Scene::new(nodes, 0, vec![floor, triangle], lights, vec![material]).unwrap()
}

/// The default config without a skybox, which tests have to opt into.
pub fn config() -> RenderConfig {
    RenderConfig {
        skybox: false,
        ..Default::default()
    }
}

/// Writes a `size` x `size` PNG and returns its path.
pub fn png(dir: &Path, name: &str, size: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(size, size, image::Rgba([128, 128, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

/// Everything needed to render frames against the recording backend.
pub struct Fixture {
    pub video: RecordingVisitor,
    pub scene: Scene,
    pub resources: SceneResources,
    pub renderer: Renderer,
    pub camera: Camera,
}

impl Fixture {
    pub fn new(scene: Scene) -> Self {
        Fixture::with_skybox(scene, None)
    }

    pub fn with_skybox(scene: Scene, skybox: Option<&[PathBuf; 6]>) -> Self {
        let mut video = RecordingVisitor::new(dimensions());
        let shaders = shaders(&mut video);
        let resources = SceneResources::load(&mut video, &scene, skybox).unwrap();
        video.take_calls();

        Fixture {
            video,
            scene,
            resources,
            renderer: Renderer::new(shaders),
            camera: Camera::new(dimensions()),
        }
    }

    pub fn frame(&mut self, config: &RenderConfig) -> FrameStats {
        self.renderer
            .render(
                &mut self.video,
                &self.scene,
                &mut self.resources,
                &self.camera,
                config,
            )
            .unwrap()
    }

    /// Renders a frame and returns the calls it recorded.
    pub fn record(&mut self, config: &RenderConfig) -> (FrameStats, Vec<Call>) {
        self.video.take_calls();
        let stats = self.frame(config);
        (stats, self.video.take_calls())
    }

    pub fn shader(&self, program: Program) -> ShaderHandle {
        self.renderer.shaders().get(program)
    }
}

pub fn uniform_names(calls: &[Call]) -> Vec<&str> {
    calls
        .iter()
        .filter_map(|v| match *v {
            Call::BindUniform(ref name, _) => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

pub fn uniform<'a>(calls: &'a [Call], name: &str) -> Option<&'a UniformVariable> {
    calls.iter().rev().find_map(|v| match *v {
        Call::BindUniform(ref n, ref v) if n == name => Some(v),
        _ => None,
    })
}
