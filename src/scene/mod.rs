//! Scene description: the node graph, meshes, lights, materials and the
//! camera that views them.

pub mod camera;
pub mod graph;
pub mod light;
pub mod loader;
pub mod material;

pub use self::camera::{Camera, Movement, Projection};
pub use self::graph::{Draw, Mesh, MeshId, Node, Scene, MAX_POINT_LIGHTS};
pub use self::light::{Attenuation, Light, LightKind};
pub use self::loader::SceneFile;
pub use self::material::{Material, TextureSlot};
